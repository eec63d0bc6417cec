use super::dto;
use crate::modules::auth::session::{SessionId, SESSION_HOURS_DURATION};
use anyhow::Result;
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use rand_chacha::ChaCha8Rng;
use rand_core::RngCore;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    TransactionError, TransactionTrait,
};
use shared::UserRole;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub enum UserFromCredentialsError {
    NotFound,
    InternalError,
    InvalidPin,
}

#[derive(Debug, Error)]
pub enum RegisterStaffError {
    #[error("role is not allowed to self register")]
    RoleNotAllowed,

    #[error("license digits already registered")]
    LicenseInUse,

    #[error("failed to generate a unique employee id")]
    IdGeneration,

    #[error(transparent)]
    Db(#[from] DbErr),
}

/// Creates an employee id candidate in the `{role prefix}{license digits}{time suffix}`
/// format, eg: `DRV12340917`, `perturb_millis` shifts the time suffix so a candidate
/// that collided can be regenerated within the same millisecond.
fn employee_id_candidate(role: UserRole, license_last4: &str, perturb_millis: u64) -> String {
    let millis = Utc::now().timestamp_millis() as u64 + perturb_millis;

    format!(
        "{}{}{:04}",
        role.employee_id_prefix(),
        license_last4,
        millis % 10_000
    )
}

#[derive(Clone)]
pub struct AuthService {
    rng: Arc<Mutex<ChaCha8Rng>>,
    db: DatabaseConnection,
}

impl AuthService {
    pub fn new(db: DatabaseConnection, rng: ChaCha8Rng) -> Self {
        AuthService {
            db,
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    /// generates a new session token and creates a new session record on the DB for the user
    pub async fn new_session(
        &self,
        user_identifier: i32,
        client_ip: IpAddr,
        client_user_agent: String,
    ) -> Result<SessionId> {
        let (ses_token, public_id) = {
            let mut rng = self.rng.lock().unwrap();

            let token = SessionId::generate_new(&mut rng);
            let public_id = (rng.next_u32() >> 1).max(1) as i32;

            (token, public_id)
        };

        let new_session = entity::session::ActiveModel {
            public_id: Set(public_id),
            session_token: Set(ses_token.into_database_value()),
            created_at: Set(Utc::now()),
            expires_at: Set(Utc::now() + Duration::hours(SESSION_HOURS_DURATION)),
            user_agent: Set(client_user_agent),
            ip: Set(client_ip.to_string()),
            user_id: Set(user_identifier),
        };

        new_session.insert(&self.db).await?;

        Ok(ses_token)
    }

    /// lists all non expired sessions belonging to a user
    pub async fn get_active_user_sessions(
        &self,
        user_id: i32,
    ) -> Result<Vec<entity::session::Model>> {
        let sessions = entity::session::Entity::find()
            .filter(entity::session::Column::ExpiresAt.gt(Utc::now()))
            .filter(entity::session::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?;

        Ok(sessions)
    }

    /// deletes a session by its token
    pub async fn delete_session(&self, session_id: &SessionId) -> Result<()> {
        entity::session::Entity::delete_many()
            .filter(entity::session::Column::SessionToken.eq(session_id.into_database_value()))
            .exec(&self.db)
            .await?;

        Ok(())
    }

    /// finds a session by its public id
    pub async fn get_session_by_public_id(
        &self,
        public_id: i32,
    ) -> Result<Option<entity::session::Model>> {
        let session = entity::session::Entity::find()
            .filter(entity::session::Column::PublicId.eq(public_id))
            .one(&self.db)
            .await?;

        Ok(session)
    }

    /// gets the active user from the session token if the session is not expired,
    /// unknown, tampered and expired tokens all resolve to `None`
    pub async fn get_user_from_session_id(
        &self,
        session_id: SessionId,
    ) -> Result<Option<entity::user::Model>> {
        let user = entity::user::Entity::find()
            .inner_join(entity::session::Entity)
            .filter(entity::session::Column::ExpiresAt.gt(Utc::now()))
            .filter(
                entity::session::Column::SessionToken.eq(session_id.into_database_value()),
            )
            .filter(entity::user::Column::IsActive.eq(true))
            .one(&self.db)
            .await?;

        Ok(user)
    }

    /// finds an active user scoped to the given role from its identifier
    /// and plain text PIN, verifying the PIN against the stored hash
    ///
    /// dispatchers are looked up by dispatch id, drivers and cleaning staff
    /// by the last 4 digits of their license
    pub async fn get_user_from_credentials(
        &self,
        role: UserRole,
        identifier: &str,
        pin: &str,
    ) -> Result<entity::user::Model, UserFromCredentialsError> {
        use UserFromCredentialsError as CredErr;

        let query = entity::user::Entity::find()
            .filter(entity::user::Column::IsActive.eq(true));

        let query = match role {
            UserRole::Dispatch => query
                .filter(entity::user::Column::Role.eq(UserRole::Dispatch))
                .filter(entity::user::Column::DispatchId.eq(identifier)),
            UserRole::Driver | UserRole::CleaningStaff => query
                .filter(
                    entity::user::Column::Role
                        .is_in([UserRole::Driver, UserRole::CleaningStaff]),
                )
                .filter(entity::user::Column::LicenseLast4.eq(identifier)),
        };

        let user = query
            .one(&self.db)
            .await
            .or(Err(CredErr::InternalError))?
            .ok_or(CredErr::NotFound)?;

        let pin_is_valid = verify(pin, &user.pin_hash).or(Err(CredErr::InternalError))?;

        if !pin_is_valid {
            return Err(CredErr::InvalidPin);
        }

        Ok(user)
    }

    /// registers a driver or cleaning staff member, storing the PIN only as a
    /// bcrypt hash
    ///
    /// the generated employee id is retried once with a perturbed time suffix
    /// if it collides with an existing one
    pub async fn register_staff(
        &self,
        dto: dto::RegisterStaff,
    ) -> Result<entity::user::Model, RegisterStaffError> {
        if !dto.role.can_hold_keys() {
            return Err(RegisterStaffError::RoleNotAllowed);
        }

        let pin_hash = hash(dto.pin.trim(), DEFAULT_COST)
            .map_err(|e| RegisterStaffError::Db(DbErr::Custom(e.to_string())))?;

        let perturb: u64 = {
            let mut rng = self.rng.lock().unwrap();
            u64::from(rng.next_u32() % 1000) + 1
        };

        let created_user = self
            .db
            .transaction::<_, entity::user::Model, RegisterStaffError>(|tx| {
                Box::pin(async move {
                    let license_last4 = dto.license_last4.trim().to_owned();

                    let license_taken = entity::user::Entity::find()
                        .filter(entity::user::Column::LicenseLast4.eq(&license_last4))
                        .one(tx)
                        .await?
                        .is_some();

                    if license_taken {
                        return Err(RegisterStaffError::LicenseInUse);
                    }

                    let mut employee_id = employee_id_candidate(dto.role, &license_last4, 0);

                    let id_taken = entity::user::Entity::find()
                        .filter(entity::user::Column::EmployeeId.eq(&employee_id))
                        .one(tx)
                        .await?
                        .is_some();

                    if id_taken {
                        employee_id = employee_id_candidate(dto.role, &license_last4, perturb);

                        let still_taken = entity::user::Entity::find()
                            .filter(entity::user::Column::EmployeeId.eq(&employee_id))
                            .one(tx)
                            .await?
                            .is_some();

                        if still_taken {
                            return Err(RegisterStaffError::IdGeneration);
                        }
                    }

                    let user = entity::user::ActiveModel {
                        created_at: Set(Utc::now()),
                        employee_id: Set(employee_id),
                        full_name: Set(dto.full_name.trim().to_owned()),
                        role: Set(dto.role),
                        dispatch_id: Set(None),
                        license_last4: Set(Some(license_last4)),
                        pin_hash: Set(pin_hash),
                        is_active: Set(true),
                        ..Default::default()
                    }
                    .insert(tx)
                    .await?;

                    Ok(user)
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(e) => RegisterStaffError::Db(e),
                TransactionError::Transaction(e) => e,
            })?;

        Ok(created_user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employee_id_has_prefix_license_and_time_suffix() {
        let id = employee_id_candidate(UserRole::Driver, "1234", 0);

        assert!(id.starts_with("DRV1234"));
        assert_eq!(id.len(), 11);
        assert!(id[7..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn employee_id_prefix_follows_role() {
        let id = employee_id_candidate(UserRole::CleaningStaff, "9876", 0);

        assert!(id.starts_with("CLN9876"));
    }
}
