//! Confirmation codes, public keys, and per-role confirmation links.

use rand::Rng;
use rand::distributions::Alphanumeric;

use reliefhub_core::error::AppError;
use reliefhub_core::result::AppResult;
use reliefhub_database::IssuedCredentials;
use reliefhub_entity::delivery::{ConfirmRole, Delivery};

const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LENGTH: usize = 6;
const PUBLIC_KEY_LENGTH: usize = 12;

/// Issues confirmation codes and builds the links parties use to confirm.
#[derive(Debug, Clone)]
pub struct ConfirmationService {
    tracking_domain: String,
}

impl ConfirmationService {
    /// Creates a confirmation service that links to `tracking_domain`.
    pub fn new(tracking_domain: impl Into<String>) -> Self {
        Self {
            tracking_domain: tracking_domain.into().trim_end_matches('/').to_string(),
        }
    }

    /// A fresh 6-character uppercase alphanumeric code.
    pub fn generate_code(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..CODE_LENGTH)
            .map(|_| CODE_CHARSET[rng.gen_range(0..CODE_CHARSET.len())] as char)
            .collect()
    }

    /// A fresh opaque public URL key.
    pub fn generate_public_key(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(PUBLIC_KEY_LENGTH)
            .map(char::from)
            .collect()
    }

    /// Key and codes to assign if the next upsert creates its delivery.
    pub fn issue(&self) -> IssuedCredentials {
        IssuedCredentials {
            public_url_key: self.generate_public_key(),
            codes: ConfirmRole::ALL
                .iter()
                .map(|role| (*role, self.generate_code()))
                .collect(),
        }
    }

    /// `{domain}/delivery/{publicUrlKey}?code={code}` for `role`.
    ///
    /// Fails if the delivery was never issued a code for that role.
    pub fn confirmation_link(&self, delivery: &Delivery, role: ConfirmRole) -> AppResult<String> {
        let confirmation = delivery.confirmation(role).ok_or_else(|| {
            AppError::not_found(format!(
                "No {role} confirmation issued for delivery {}",
                delivery.delivery_ref
            ))
        })?;
        Ok(format!(
            "{}/delivery/{}?code={}",
            self.tracking_domain, delivery.public_url_key, confirmation.code
        ))
    }
}
