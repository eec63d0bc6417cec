use crate::modules::{auth, common, key, loan, report, user, vehicle};
use crate::server::controller;
use axum::Router;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::openapi::{ContactBuilder, InfoBuilder};
use utoipa::{openapi::OpenApiBuilder, Modify, OpenApi};
use utoipa_rapidoc::RapiDoc;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    components(schemas(
        shared::UserRole,
        shared::KeyStatus,
        shared::VehicleStatus,
        shared::TransactionStatus,
        shared::VehicleCondition,

        entity::vehicle::Model,
        entity::vehicle_key::Model,
        entity::key_transaction::Model,

        common::dto::PaginatedStaff,
        common::dto::PaginatedVehicle,
        common::dto::PaginatedVehicleKey,
        common::dto::PaginatedIncident,
        common::responses::SimpleError,

        auth::dto::SignIn,
        auth::dto::UserDto,
        auth::dto::SessionDto,
        auth::dto::RegisterStaff,
        auth::dto::SignInResponse,

        user::dto::StaffMemberDto,

        vehicle::dto::CreateVehicleDto,

        key::dto::RegisterKeyDto,
        key::dto::SearchKeyDto,
        key::dto::KeyAvailabilityDto,
        key::dto::KeySearchResultDto,

        loan::dto::CheckOutDto,
        loan::dto::CheckInDto,
        loan::dto::OpenLoanDto,

        report::dto::FleetOverviewDto,
        report::dto::VehicleSummaryDto,
        report::dto::HolderDto,
        report::dto::ActiveLoanDto,
        report::dto::VehicleUsageDto,
        report::dto::StaffUsageDto,
        report::dto::IncidentDto,
    )),
    paths(
        controller::healthcheck,

        auth::routes::sign_up,
        auth::routes::sign_in,
        auth::routes::sign_out,
        auth::routes::list_sessions,
        auth::routes::sign_out_session_by_id,

        user::routes::me,
        user::routes::list_staff,

        vehicle::routes::create_vehicle,
        vehicle::routes::vehicle_by_id,
        vehicle::routes::list_vehicles,

        key::routes::register_key,
        key::routes::list_keys,
        key::routes::search_key,

        loan::routes::check_out,
        loan::routes::check_in,
        loan::routes::my_open_loans,

        report::routes::overview,
        report::routes::active_loans,
        report::routes::overdue_loans,
        report::routes::vehicle_usage,
        report::routes::staff_usage,
        report::routes::incidents,
    ),
    modifiers(&SessionIdCookieSecurityScheme),
)]
struct ApiDoc;

/// session id on request cookie for user session authentication,
/// unfortunately this does not work on rapidoc or swagger UI for now, see:
///
/// https://github.com/swagger-api/swagger-js/issues/1163
struct SessionIdCookieSecurityScheme;

impl Modify for SessionIdCookieSecurityScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            // unfortunately as of writing this, the open api spec does not support
            // scopes for apiKey authentication, such as cookies.
            components.add_security_scheme(
                "session_id",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "sid",
                    "session identifier",
                ))),
            )
        }
    }
}

pub fn create_openapi_router() -> Router<controller::AppState> {
    let builder: OpenApiBuilder = ApiDoc::openapi().into();

    let info = InfoBuilder::new()
        .title("Fleet key tracker API")
        .description(Some(
            "Check-out / check-in tracking for fleet vehicle keys.",
        ))
        .version("0.1.0")
        .contact(Some(
            ContactBuilder::new()
                .name(Some("fleet dispatch team"))
                .build(),
        ))
        .build();

    let api_doc = builder.info(info).build();

    Router::new()
        .merge(SwaggerUi::new("/swagger").url("/docs/openapi.json", api_doc))
        .merge(RapiDoc::new("/docs/openapi.json").path("/rapidoc"))
}
