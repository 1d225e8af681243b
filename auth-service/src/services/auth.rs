use crate::{
    config::TokenConfig,
    dtos::auth::{AuthResponse, SignInBasicRequest, SignUpBasicRequest, TokensResponse, UserResponse},
    models::{Keystore, RoleCode, User},
    services::{MongoDb, ServiceError, TokenCodec, TokenError, TokenPayload},
    utils::{hash_password, verify_password, Password, PasswordHashString},
};
use mongodb::bson::oid::ObjectId;
use rand::RngCore;
use service_core::error::AppError;

/// Authentication flows built on the keystore session model. Every
/// issued token pair is backed by one keystore record; the record is
/// read or deleted, never mutated.
#[derive(Clone)]
pub struct AuthService {
    db: MongoDb,
    jwt: TokenCodec,
    token_config: TokenConfig,
}

impl AuthService {
    pub fn new(db: MongoDb, jwt: TokenCodec, token_config: TokenConfig) -> Self {
        Self {
            db,
            jwt,
            token_config,
        }
    }

    pub async fn sign_up_basic(&self, req: SignUpBasicRequest) -> Result<AuthResponse, AppError> {
        if self.db.find_user_by_email(&req.email).await?.is_some() {
            return Err(ServiceError::AlreadyRegistered.into());
        }

        let role = self
            .db
            .find_role_by_code(RoleCode::Viewer)
            .await?
            .ok_or_else(|| ServiceError::InternalString("Default role not configured".into()))?;

        let password_hash = hash_password(&Password::new(req.password))
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Password hashing error: {}", e)))?;

        let user = User::new(
            req.email,
            password_hash.into_string(),
            req.name,
            req.profile_pic_url,
            role.id,
        );
        self.db.insert_user(&user).await?;

        tracing::info!(user_id = %user.id, "User registered");

        let tokens = self.issue_tokens(&user).await?;
        Ok(AuthResponse {
            user: UserResponse::from_user(&user, vec![role]),
            tokens,
        })
    }

    pub async fn sign_in_basic(&self, req: SignInBasicRequest) -> Result<AuthResponse, AppError> {
        let user = self
            .db
            .find_user_by_email(&req.email)
            .await?
            .ok_or(ServiceError::UserNotFound)?;

        let stored_hash = user
            .password
            .as_deref()
            .ok_or(ServiceError::CredentialNotSet)?;

        verify_password(
            &Password::new(req.password),
            &PasswordHashString::new(stored_hash.to_string()),
        )
        .map_err(|_| ServiceError::AuthenticationFailure)?;

        let roles = self.db.find_active_roles(&user.roles).await?;
        let tokens = self.issue_tokens(&user).await?;

        tracing::info!(user_id = %user.id, "User signed in");

        Ok(AuthResponse {
            user: UserResponse::from_user(&user, roles),
            tokens,
        })
    }

    /// End the session backing the presented access token.
    pub async fn sign_out(&self, keystore: &Keystore) -> Result<(), AppError> {
        self.db.delete_keystore(keystore.id).await?;
        tracing::info!(user_id = %keystore.client, "Session ended");
        Ok(())
    }

    /// End every session the user holds, on any device.
    pub async fn sign_out_everywhere(&self, user: &User) -> Result<u64, AppError> {
        let removed = self.db.delete_keystores_for_client(user.id).await?;
        tracing::info!(user_id = %user.id, sessions = removed, "All sessions ended");
        Ok(removed)
    }

    /// Single-use refresh. The spent session is consumed before the new
    /// pair is issued, so a concurrent refresh of the same pair loses
    /// the race and fails closed.
    pub async fn refresh_tokens(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<TokensResponse, AppError> {
        // The access token is typically expired here, so only its
        // structure is read. Authenticity comes from the exact-pair
        // keystore lookup below.
        let access_payload = self
            .jwt
            .decode_unverified(access_token)
            .map_err(|_| ServiceError::InvalidAccessToken)?;

        if !payload_is_valid(
            &access_payload,
            &self.token_config.issuer,
            &self.token_config.audience,
        ) {
            return Err(ServiceError::InvalidAccessToken.into());
        }

        let user_id = ObjectId::parse_str(&access_payload.sub)
            .map_err(|_| ServiceError::InvalidAccessToken)?;

        let user = self
            .db
            .find_user_by_id(user_id)
            .await?
            .ok_or(ServiceError::UserNotRegistered)?;

        let refresh_payload = self.jwt.verify(refresh_token).map_err(|e| match e {
            TokenError::Expired => ServiceError::TokenExpired,
            TokenError::Invalid => ServiceError::InvalidAccessToken,
        })?;

        if !payload_is_valid(
            &refresh_payload,
            &self.token_config.issuer,
            &self.token_config.audience,
        ) {
            return Err(ServiceError::InvalidAccessToken.into());
        }

        if access_payload.sub != refresh_payload.sub {
            return Err(ServiceError::InvalidAccessToken.into());
        }

        // Atomic claim: a concurrent refresh of the same pair loses here.
        self.db
            .consume_keystore_pair(user.id, &access_payload.prm, &refresh_payload.prm)
            .await?
            .ok_or(ServiceError::InvalidAccessToken)?;

        tracing::info!(user_id = %user.id, "Session rotated");

        self.issue_tokens(&user).await
    }

    /// Create a keystore record and sign the access/refresh pair bound
    /// to it.
    async fn issue_tokens(&self, user: &User) -> Result<TokensResponse, AppError> {
        let primary_key = generate_token_key();
        let secondary_key = generate_token_key();

        let keystore = Keystore::new(user.id, primary_key.clone(), secondary_key.clone());
        self.db.insert_keystore(&keystore).await?;

        let access_payload = TokenPayload::new(
            &self.token_config.issuer,
            &self.token_config.audience,
            &user.id.to_hex(),
            &primary_key,
            self.token_config.access_token_validity_secs,
        );
        let refresh_payload = TokenPayload::new(
            &self.token_config.issuer,
            &self.token_config.audience,
            &user.id.to_hex(),
            &secondary_key,
            self.token_config.refresh_token_validity_secs,
        );

        let access_token = self.jwt.sign(&access_payload).map_err(AppError::InternalError)?;
        let refresh_token = self.jwt.sign(&refresh_payload).map_err(AppError::InternalError)?;

        Ok(TokensResponse {
            access_token,
            refresh_token,
        })
    }
}

/// 64 random bytes, hex encoded. Used for the keystore primary and
/// secondary keys.
pub fn generate_token_key() -> String {
    let mut bytes = [0u8; 64];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Claim sanity check shared by the access guard and the refresh flow.
/// Signature and expiry are the codec's concern; this only pins the
/// claims to this deployment and requires a usable subject.
pub fn payload_is_valid(payload: &TokenPayload, issuer: &str, audience: &str) -> bool {
    !payload.iss.is_empty()
        && !payload.aud.is_empty()
        && !payload.sub.is_empty()
        && !payload.prm.is_empty()
        && payload.iss == issuer
        && payload.aud == audience
        && ObjectId::parse_str(&payload.sub).is_ok()
}
