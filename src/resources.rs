//! Typed bindings of the console's entities to their REST paths.
use anyhow::Result;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::api::model::{PageRequest, RequestResponse};
use crate::api::Transport;
use crate::collection::{
    create, get_all, get_by_id, search, update, SearchParameters, UpdateMethod,
};
use crate::error::FetchError;
use crate::model::{
    BusinessLog, ChangePassword, ChargePoint, Component, Configuration, CreateChargePoint,
    CreateConfiguration, CreateFirmware, CreateUser, Firmware, TechnicalLog, Transcriptor,
    TypeAllowed, User, UserRole,
};

pub const FIRMWARE: &str = "/api/firmware";
pub const CONFIGURATION: &str = "/api/configuration";
pub const CHARGE_POINT: &str = "/api/chargepoint";
pub const USER: &str = "/api/user";
pub const BUSINESS_LOG: &str = "/api/log/business";
pub const TECHNICAL_LOG: &str = "/api/log/technical";
pub const TYPE_ALLOWED: &str = "/api/type";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Firmware,
    Configuration,
    ChargePoint,
    User,
    BusinessLog,
    TechnicalLog,
    TypeAllowed,
}

impl Resource {
    pub const ALL: [Resource; 7] = [
        Resource::Firmware,
        Resource::Configuration,
        Resource::ChargePoint,
        Resource::User,
        Resource::BusinessLog,
        Resource::TechnicalLog,
        Resource::TypeAllowed,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Resource::Firmware => "firmware",
            Resource::Configuration => "configuration",
            Resource::ChargePoint => "chargepoint",
            Resource::User => "user",
            Resource::BusinessLog => "business-log",
            Resource::TechnicalLog => "technical-log",
            Resource::TypeAllowed => "type",
        }
    }

    pub fn base_path(&self) -> &'static str {
        match self {
            Resource::Firmware => FIRMWARE,
            Resource::Configuration => CONFIGURATION,
            Resource::ChargePoint => CHARGE_POINT,
            Resource::User => USER,
            Resource::BusinessLog => BUSINESS_LOG,
            Resource::TechnicalLog => TECHNICAL_LOG,
            Resource::TypeAllowed => TYPE_ALLOWED,
        }
    }

    /// Paginated search endpoint, if the backend exposes one.
    pub fn search_path(&self) -> Option<String> {
        match self {
            Resource::TypeAllowed => None,
            other => Some(format!("{}/search", other.base_path())),
        }
    }

    /// Unpaginated listing endpoint, if the backend exposes one.
    pub fn all_path(&self) -> Option<String> {
        match self {
            Resource::Configuration | Resource::User | Resource::TypeAllowed => {
                Some(format!("{}/all", self.base_path()))
            }
            _ => None,
        }
    }

    pub fn supports_get_by_id(&self) -> bool {
        matches!(
            self,
            Resource::Firmware
                | Resource::Configuration
                | Resource::ChargePoint
                | Resource::BusinessLog
        )
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Resource::ALL
            .into_iter()
            .find(|r| r.name() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Resource::ALL.iter().map(|r| r.name()).collect();
                format!("unknown resource `{}` (expected one of {})", s, known.join(", "))
            })
    }
}

// Firmware

pub async fn search_firmwares<C: Transport + ?Sized>(
    transport: &C,
    params: &SearchParameters,
) -> Result<PageRequest<Firmware>, FetchError> {
    search(transport, &format!("{}/search", FIRMWARE), Some(params)).await
}

pub async fn get_firmware<C: Transport + ?Sized>(
    transport: &C,
    id: i64,
) -> Result<Firmware, FetchError> {
    get_by_id(transport, FIRMWARE, id).await
}

pub async fn create_firmware<C: Transport + ?Sized>(
    transport: &C,
    firmware: &CreateFirmware,
) -> Result<RequestResponse<Firmware>> {
    create(transport, &format!("{}/create", FIRMWARE), firmware).await
}

pub async fn update_firmware<C: Transport + ?Sized>(
    transport: &C,
    id: i64,
    firmware: &CreateFirmware,
) -> Result<RequestResponse<Firmware>> {
    let path = format!("{}/update/{}", FIRMWARE, id);
    update(transport, UpdateMethod::Patch, &path, Some(firmware)).await
}

pub async fn all_types_allowed<C: Transport + ?Sized>(
    transport: &C,
) -> Result<Vec<TypeAllowed>, FetchError> {
    get_all(transport, &format!("{}/all", TYPE_ALLOWED)).await
}

// Configuration

pub async fn search_configurations<C: Transport + ?Sized>(
    transport: &C,
    params: &SearchParameters,
) -> Result<PageRequest<Configuration>, FetchError> {
    search(transport, &format!("{}/search", CONFIGURATION), Some(params)).await
}

pub async fn all_configurations<C: Transport + ?Sized>(
    transport: &C,
) -> Result<Vec<Configuration>, FetchError> {
    get_all(transport, &format!("{}/all", CONFIGURATION)).await
}

pub async fn get_configuration<C: Transport + ?Sized>(
    transport: &C,
    id: i64,
) -> Result<Configuration, FetchError> {
    get_by_id(transport, CONFIGURATION, id).await
}

pub async fn transcriptors<C: Transport + ?Sized>(
    transport: &C,
) -> Result<Vec<Transcriptor>, FetchError> {
    get_all(transport, &format!("{}/transcriptor", CONFIGURATION)).await
}

pub async fn create_configuration<C: Transport + ?Sized>(
    transport: &C,
    configuration: &CreateConfiguration,
) -> Result<RequestResponse<Configuration>> {
    create(transport, &format!("{}/create", CONFIGURATION), configuration).await
}

pub async fn update_configuration<C: Transport + ?Sized>(
    transport: &C,
    id: i64,
    configuration: &CreateConfiguration,
) -> Result<RequestResponse<Configuration>> {
    let path = format!("{}/{}", CONFIGURATION, id);
    update(transport, UpdateMethod::Patch, &path, Some(configuration)).await
}

// Charge points

pub async fn search_charge_points<C: Transport + ?Sized>(
    transport: &C,
    params: &SearchParameters,
) -> Result<PageRequest<ChargePoint>, FetchError> {
    search(transport, &format!("{}/search", CHARGE_POINT), Some(params)).await
}

pub async fn get_charge_point<C: Transport + ?Sized>(
    transport: &C,
    id: i64,
) -> Result<ChargePoint, FetchError> {
    get_by_id(transport, CHARGE_POINT, id).await
}

pub async fn create_charge_point<C: Transport + ?Sized>(
    transport: &C,
    charge_point: &CreateChargePoint,
) -> Result<RequestResponse<ChargePoint>> {
    create(transport, &format!("{}/create", CHARGE_POINT), charge_point).await
}

pub async fn update_charge_point<C: Transport + ?Sized>(
    transport: &C,
    id: i64,
    charge_point: &CreateChargePoint,
) -> Result<RequestResponse<ChargePoint>> {
    let path = format!("{}/{}", CHARGE_POINT, id);
    update(transport, UpdateMethod::Patch, &path, Some(charge_point)).await
}

// Users

pub async fn search_users<C: Transport + ?Sized>(
    transport: &C,
    params: &SearchParameters,
) -> Result<PageRequest<User>, FetchError> {
    search(transport, &format!("{}/search", USER), Some(params)).await
}

pub async fn all_users<C: Transport + ?Sized>(transport: &C) -> Result<Vec<User>, FetchError> {
    get_all(transport, &format!("{}/all", USER)).await
}

pub async fn all_roles<C: Transport + ?Sized>(
    transport: &C,
) -> Result<Vec<UserRole>, FetchError> {
    get_all(transport, &format!("{}/allRoles", USER)).await
}

pub async fn create_user<C: Transport + ?Sized>(
    transport: &C,
    user: &CreateUser,
) -> Result<RequestResponse<User>> {
    create(transport, &format!("{}/create", USER), user).await
}

pub async fn update_password<C: Transport + ?Sized>(
    transport: &C,
    id: i64,
    change: &ChangePassword,
) -> Result<RequestResponse<User>> {
    let path = format!("{}/updatePassword/{}", USER, id);
    update(transport, UpdateMethod::Patch, &path, Some(change)).await
}

/// Role change is a bodyless state transition.
pub async fn update_role<C: Transport + ?Sized>(
    transport: &C,
    id: i64,
    role: UserRole,
) -> Result<RequestResponse<User>> {
    let path = format!("{}/{}/role/{}", USER, id, role.as_str());
    update::<User, Value, C>(transport, UpdateMethod::Patch, &path, None).await
}

// Logs

pub async fn search_business_logs<C: Transport + ?Sized>(
    transport: &C,
    params: &SearchParameters,
) -> Result<PageRequest<BusinessLog>, FetchError> {
    search(transport, &format!("{}/search", BUSINESS_LOG), Some(params)).await
}

pub async fn get_business_log<C: Transport + ?Sized>(
    transport: &C,
    id: i64,
) -> Result<BusinessLog, FetchError> {
    get_by_id(transport, BUSINESS_LOG, id).await
}

pub async fn search_technical_logs<C: Transport + ?Sized>(
    transport: &C,
    params: &SearchParameters,
) -> Result<PageRequest<TechnicalLog>, FetchError> {
    search(transport, &format!("{}/search", TECHNICAL_LOG), Some(params)).await
}

pub async fn technical_logs_by<C: Transport + ?Sized>(
    transport: &C,
    component: Component,
    level: &str,
) -> Result<Vec<TechnicalLog>, FetchError> {
    let path = format!("{}/{}/{}", TECHNICAL_LOG, component.as_str(), level);
    get_all(transport, &path).await
}
