use crate::modules::common::validators::REGEX_IS_KEY_NUMBER;
use serde::{Deserialize, Serialize};
use shared::KeyStatus;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterKeyDto {
    /// number printed on the key tag, stored uppercase
    #[validate(regex(
        path = "REGEX_IS_KEY_NUMBER",
        message = "key number must be alphanumeric, eg: K001"
    ))]
    pub key_number: String,

    pub vehicle_id: i32,

    /// where the key physically hangs, eg: Hook A1
    #[validate(length(min = 1, max = 64))]
    pub location: String,

    pub notes: Option<String>,
}

#[derive(Deserialize, IntoParams, Validate)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListKeysDto {
    /// Filter by key status
    pub status: Option<KeyStatus>,
}

#[derive(Deserialize, IntoParams, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchKeyDto {
    /// the number printed on the key tag, case insensitive
    #[validate(length(min = 1, max = 32))]
    pub number: String,
}

/// Availability of a searched key relative to the caller
#[derive(Serialize, ToSchema, Debug, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum KeyAvailabilityDto {
    /// the key is on the board and can be checked out
    Available,

    /// the caller holds this key, it can be checked back in using the loan id
    #[serde(rename_all = "camelCase")]
    CheckedOutByMe { loan_id: i32 },

    /// someone else holds this key, only showing who
    #[serde(rename_all = "camelCase")]
    CheckedOutByOther { holder_name: String },
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeySearchResultDto {
    pub key: entity::vehicle_key::Model,
    pub vehicle: entity::vehicle::Model,
    pub availability: KeyAvailabilityDto,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_serializes_with_a_kind_tag() {
        let by_me = serde_json::to_value(KeyAvailabilityDto::CheckedOutByMe { loan_id: 3 }).unwrap();

        assert_eq!(
            by_me,
            serde_json::json!({ "kind": "checkedOutByMe", "loanId": 3 })
        );

        let by_other = serde_json::to_value(KeyAvailabilityDto::CheckedOutByOther {
            holder_name: String::from("Juan Perez"),
        })
        .unwrap();

        assert_eq!(
            by_other,
            serde_json::json!({ "kind": "checkedOutByOther", "holderName": "Juan Perez" })
        );

        let available = serde_json::to_value(KeyAvailabilityDto::Available).unwrap();

        assert_eq!(available, serde_json::json!({ "kind": "available" }));
    }
}
