use chrono::{DateTime, Duration, Utc};
use migration::Expr;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, Set, TransactionError, TransactionTrait,
};
use shared::{KeyStatus, TransactionStatus, VehicleCondition, VehicleStatus};
use thiserror::Error;

/// an open loan older than this many hours is flagged overdue on the
/// reporting views, the flag is derived on read and never stored
pub const OVERDUE_AFTER_HOURS: i64 = 12;

pub const INCIDENT_REPORT_MIN_LEN: usize = 10;
pub const INCIDENT_REPORT_MAX_LEN: usize = 1000;

/// whether an open loan checked out at `checkout_time` is overdue at `now`
pub fn is_overdue(checkout_time: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - checkout_time > Duration::hours(OVERDUE_AFTER_HOURS)
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("key not found")]
    KeyNotFound,

    #[error("key is not available, current status: {0}")]
    KeyNotAvailable(KeyStatus),

    #[error("key already has an open loan")]
    KeyInUse,

    #[error("open loan limit of {0} reached")]
    LimitReached(u64),

    #[error(transparent)]
    Db(#[from] DbErr),
}

#[derive(Debug, Error)]
pub enum CheckinError {
    #[error("loan not found")]
    LoanNotFound,

    #[error("loan belongs to another staff member")]
    NotLoanOwner,

    #[error("loan is already closed")]
    AlreadyCheckedIn,

    #[error("key must be held for at least {0} seconds before being returned")]
    ReturnedTooSoon(i64),

    #[error("an incident report is required when the vehicle condition is not GOOD")]
    IncidentReportRequired,

    #[error("incident report must be between 10 and 1000 characters")]
    IncidentReportLength,

    #[error(transparent)]
    Db(#[from] DbErr),
}

/// Checks out a key for a staff member, creating the open ledger row and
/// flipping the key and vehicle statuses as a single atomic unit.
///
/// the status flip is a conditional update filtered on the current AVAILABLE
/// status, so of two concurrent checkouts of the same key exactly one sees
/// an affected row and wins, the loser fails before any row it wrote becomes
/// visible.
pub async fn checkout(
    db: &DatabaseConnection,
    user_id: i32,
    key_id: i32,
    max_open_loans: u64,
) -> Result<entity::key_transaction::Model, CheckoutError> {
    db.transaction::<_, entity::key_transaction::Model, CheckoutError>(|tx| {
        Box::pin(async move {
            let key = entity::vehicle_key::Entity::find_by_id(key_id)
                .one(tx)
                .await?
                .ok_or(CheckoutError::KeyNotFound)?;

            if key.status != KeyStatus::Available {
                return Err(CheckoutError::KeyNotAvailable(key.status));
            }

            // the key status should already guarantee this, re-check the
            // ledger anyway so a status flag that drifted from the ledger
            // can never produce two open loans on one key
            let open_loans_on_key = entity::key_transaction::Entity::find()
                .filter(entity::key_transaction::Column::KeyId.eq(key_id))
                .filter(
                    entity::key_transaction::Column::Status.eq(TransactionStatus::CheckedOut),
                )
                .count(tx)
                .await?;

            if open_loans_on_key > 0 {
                return Err(CheckoutError::KeyInUse);
            }

            let open_loans_by_user = entity::key_transaction::Entity::find()
                .filter(entity::key_transaction::Column::UserId.eq(user_id))
                .filter(
                    entity::key_transaction::Column::Status.eq(TransactionStatus::CheckedOut),
                )
                .count(tx)
                .await?;

            if open_loans_by_user >= max_open_loans {
                return Err(CheckoutError::LimitReached(max_open_loans));
            }

            let claimed = entity::vehicle_key::Entity::update_many()
                .col_expr(
                    entity::vehicle_key::Column::Status,
                    KeyStatus::CheckedOut.as_enum(),
                )
                .filter(entity::vehicle_key::Column::Id.eq(key_id))
                .filter(entity::vehicle_key::Column::Status.eq(KeyStatus::Available))
                .exec(tx)
                .await?;

            if claimed.rows_affected == 0 {
                // a concurrent checkout won the race
                return Err(CheckoutError::KeyNotAvailable(KeyStatus::CheckedOut));
            }

            entity::vehicle::Entity::update_many()
                .col_expr(
                    entity::vehicle::Column::Status,
                    VehicleStatus::InUse.as_enum(),
                )
                .filter(entity::vehicle::Column::Id.eq(key.vehicle_id))
                .exec(tx)
                .await?;

            let loan = entity::key_transaction::ActiveModel {
                key_id: Set(key_id),
                user_id: Set(user_id),
                status: Set(TransactionStatus::CheckedOut),
                checkout_time: Set(Utc::now()),
                checkin_time: Set(None),
                vehicle_condition: Set(None),
                incident_report: Set(None),
                ..Default::default()
            }
            .insert(tx)
            .await?;

            Ok(loan)
        })
    })
    .await
    .map_err(|e| match e {
        TransactionError::Connection(e) => CheckoutError::Db(e),
        TransactionError::Transaction(e) => e,
    })
}

/// Closes a loan, writing the return condition to the ledger row and
/// flipping the key back to AVAILABLE and the vehicle to AVAILABLE or
/// MAINTENANCE depending on the reported condition, atomically.
///
/// only the staff member that opened the loan may close it, and a loan
/// can only be closed once.
pub async fn checkin(
    db: &DatabaseConnection,
    user_id: i32,
    loan_id: i32,
    condition: VehicleCondition,
    incident_report: Option<String>,
    min_loan_secs: i64,
) -> Result<entity::key_transaction::Model, CheckinError> {
    let report = incident_report
        .map(|r| r.trim().to_owned())
        .filter(|r| !r.is_empty());

    match &report {
        None if condition.requires_incident_report() => {
            return Err(CheckinError::IncidentReportRequired)
        }
        Some(r) => {
            let len = r.chars().count();

            if !(INCIDENT_REPORT_MIN_LEN..=INCIDENT_REPORT_MAX_LEN).contains(&len) {
                return Err(CheckinError::IncidentReportLength);
            }
        }
        None => {}
    }

    db.transaction::<_, entity::key_transaction::Model, CheckinError>(|tx| {
        Box::pin(async move {
            let loan = entity::key_transaction::Entity::find_by_id(loan_id)
                .one(tx)
                .await?
                .ok_or(CheckinError::LoanNotFound)?;

            if loan.user_id != user_id {
                return Err(CheckinError::NotLoanOwner);
            }

            if loan.status != TransactionStatus::CheckedOut {
                return Err(CheckinError::AlreadyCheckedIn);
            }

            if min_loan_secs > 0 {
                let held_for = Utc::now() - loan.checkout_time;

                if held_for.num_seconds() < min_loan_secs {
                    return Err(CheckinError::ReturnedTooSoon(min_loan_secs));
                }
            }

            let closed = entity::key_transaction::Entity::update_many()
                .col_expr(
                    entity::key_transaction::Column::Status,
                    TransactionStatus::CheckedIn.as_enum(),
                )
                .col_expr(
                    entity::key_transaction::Column::CheckinTime,
                    Expr::value(Utc::now()),
                )
                .col_expr(
                    entity::key_transaction::Column::VehicleCondition,
                    condition.as_enum(),
                )
                .col_expr(
                    entity::key_transaction::Column::IncidentReport,
                    Expr::value(report.clone()),
                )
                .filter(entity::key_transaction::Column::Id.eq(loan_id))
                .filter(
                    entity::key_transaction::Column::Status.eq(TransactionStatus::CheckedOut),
                )
                .exec(tx)
                .await?;

            if closed.rows_affected == 0 {
                // a concurrent return of the same loan won the race
                return Err(CheckinError::AlreadyCheckedIn);
            }

            let key = entity::vehicle_key::Entity::find_by_id(loan.key_id)
                .one(tx)
                .await?
                .ok_or_else(|| DbErr::Custom(String::from("loan references a missing key")))?;

            entity::vehicle_key::Entity::update_many()
                .col_expr(
                    entity::vehicle_key::Column::Status,
                    KeyStatus::Available.as_enum(),
                )
                .filter(entity::vehicle_key::Column::Id.eq(key.id))
                .exec(tx)
                .await?;

            let vehicle_status = if condition == VehicleCondition::Good {
                VehicleStatus::Available
            } else {
                VehicleStatus::Maintenance
            };

            entity::vehicle::Entity::update_many()
                .col_expr(entity::vehicle::Column::Status, vehicle_status.as_enum())
                .filter(entity::vehicle::Column::Id.eq(key.vehicle_id))
                .exec(tx)
                .await?;

            let closed_loan = entity::key_transaction::Entity::find_by_id(loan_id)
                .one(tx)
                .await?
                .ok_or_else(|| {
                    DbErr::Custom(String::from("closed loan disappeared mid transaction"))
                })?;

            Ok(closed_loan)
        })
    })
    .await
    .map_err(|e| match e {
        TransactionError::Connection(e) => CheckinError::Db(e),
        TransactionError::Transaction(e) => e,
    })
}

/// lists the open loans of a staff member, most recent checkout first
pub async fn open_loans_for_user(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<entity::key_transaction::Model>, DbErr> {
    use sea_orm::QueryOrder;

    entity::key_transaction::Entity::find()
        .filter(entity::key_transaction::Column::UserId.eq(user_id))
        .filter(entity::key_transaction::Column::Status.eq(TransactionStatus::CheckedOut))
        .order_by_desc(entity::key_transaction::Column::CheckoutTime)
        .all(db)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loan_13_hours_old_is_overdue() {
        let now = Utc::now();

        assert!(is_overdue(now - Duration::hours(13), now));
    }

    #[test]
    fn loan_11_hours_old_is_not_overdue() {
        let now = Utc::now();

        assert!(!is_overdue(now - Duration::hours(11), now));
        assert!(!is_overdue(now, now));
    }

    #[test]
    fn overdue_boundary_is_exclusive() {
        let now = Utc::now();

        assert!(!is_overdue(now - Duration::hours(OVERDUE_AFTER_HOURS), now));
        assert!(is_overdue(
            now - Duration::hours(OVERDUE_AFTER_HOURS) - Duration::seconds(1),
            now
        ));
    }
}
