use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Id sent in place of a configuration when a charge point has none.
pub const NO_CONFIGURATION: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Visualizer,
    Editor,
    Administrator,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [
        UserRole::Visualizer,
        UserRole::Editor,
        UserRole::Administrator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Visualizer => "VISUALIZER",
            UserRole::Editor => "EDITOR",
            UserRole::Administrator => "ADMINISTRATOR",
        }
    }

    /// Label displayed by the console.
    pub fn french_label(&self) -> &'static str {
        match self {
            UserRole::Visualizer => "Visualiseur",
            UserRole::Editor => "Éditeur",
            UserRole::Administrator => "Administrateur",
        }
    }

    pub fn from_french_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|role| role.french_label() == label.trim())
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the API name (any case) or the French label.
impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .or_else(|| Self::from_french_label(s))
            .ok_or_else(|| format!("unknown role `{}`", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdentity {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub last_name: String,
    pub first_name: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub email: String,
    pub last_name: String,
    pub first_name: String,
    pub password: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePassword {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeAllowed {
    pub id: i64,
    pub constructor: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Firmware {
    pub id: i64,
    pub url: String,
    pub version: String,
    pub constructor: String,
    #[serde(default)]
    pub types_allowed: Vec<TypeAllowed>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFirmware {
    pub version: String,
    pub url: String,
    pub constructor: String,
    pub types_allowed: Vec<TypeAllowed>,
}

/// A configurable key of a charge point, with the pattern its value must match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcriptor {
    pub id: i64,
    pub full_name: String,
    pub regex: String,
}

impl Transcriptor {
    /// Whole-value match of `value` against the transcriptor's pattern.
    pub fn accepts(&self, value: &str) -> Result<bool, regex::Error> {
        let pattern = Regex::new(&format!("^(?:{})$", self.regex))?;
        Ok(pattern.is_match(value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[serde(with = "timestamp")]
    pub last_edit: NaiveDateTime,
    /// JSON object mapping transcriptor id (or name) to value.
    pub configuration: String,
    pub firmware: Firmware,
}

impl Configuration {
    pub fn entries(&self) -> Result<BTreeMap<String, String>, serde_json::Error> {
        if self.configuration.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&self.configuration)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConfiguration {
    pub name: String,
    pub description: String,
    pub configuration: String,
    /// Firmware version the configuration targets.
    pub firmware: String,
}

impl CreateConfiguration {
    pub fn from_entries<'a>(
        name: impl Into<String>,
        description: impl Into<String>,
        firmware: impl Into<String>,
        entries: impl IntoIterator<Item = (&'a Transcriptor, &'a str)>,
    ) -> Self {
        let map: Map<String, Value> = entries
            .into_iter()
            .map(|(key, value)| (key.id.to_string(), Value::String(value.to_string())))
            .collect();
        Self {
            name: name.into(),
            description: description.into(),
            configuration: Value::Object(map).to_string(),
            firmware: firmware.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Step {
    Firmware,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusProcess {
    Pending,
    Processing,
    Finished,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargePointStatus {
    #[serde(with = "timestamp")]
    pub last_update: NaiveDateTime,
    #[serde(default)]
    pub error: Option<String>,
    /// `true` while the charge point is connected.
    pub state: bool,
    pub step: Step,
    pub status: StatusProcess,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargePoint {
    pub id: i64,
    #[serde(rename = "serialNumberChargePoint", alias = "serialNumberChargepoint")]
    pub serial_number: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub constructor: String,
    pub client_id: String,
    #[serde(default)]
    pub configuration: Option<Configuration>,
    #[serde(default)]
    pub status: Option<ChargePointStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChargePoint {
    pub serial_number: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub constructor: String,
    pub client_id: String,
    /// Configuration id, or [`NO_CONFIGURATION`].
    pub configuration: i64,
}

/// Status update pushed on the real-time channel for one charge point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargePointNotification {
    pub id: i64,
    pub status: ChargePointStatus,
}

impl ChargePointNotification {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogCategory {
    Login,
    Status,
    Firm,
    Config,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessLog {
    pub id: i64,
    #[serde(with = "timestamp")]
    pub date: NaiveDateTime,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub chargepoint: Option<ChargePoint>,
    pub category: LogCategory,
    pub level: String,
    pub complete_log: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Component {
    Backend,
    Frontend,
    Websocket,
    Database,
}

impl Component {
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Backend => "BACKEND",
            Component::Frontend => "FRONTEND",
            Component::Websocket => "WEBSOCKET",
            Component::Database => "DATABASE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalLog {
    pub id: i64,
    #[serde(with = "timestamp")]
    pub date: NaiveDateTime,
    pub component: Component,
    pub level: String,
    pub complete_log: String,
}

/// Backend timestamps arrive as RFC 3339, as zone-less ISO date-times or as
/// epoch milliseconds. They are kept as naive UTC.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    const ISO_LOCAL: &str = "%Y-%m-%dT%H:%M:%S%.f";

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(i64),
        Text(String),
    }

    pub fn parse(text: &str) -> Option<NaiveDateTime> {
        let text = text.trim();
        DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.naive_utc())
            .or_else(|_| NaiveDateTime::parse_from_str(text, ISO_LOCAL))
            .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
    }

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(ISO_LOCAL).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Millis(ms) => DateTime::from_timestamp_millis(ms)
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range: {}", ms))),
            Raw::Text(text) => parse(&text)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp `{}`", text))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn roles_translate_both_ways() {
        for role in UserRole::ALL {
            assert_eq!(UserRole::from_french_label(role.french_label()), Some(role));
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
        assert_eq!("Éditeur".parse::<UserRole>().unwrap(), UserRole::Editor);
        assert_eq!("editor".parse::<UserRole>().unwrap(), UserRole::Editor);
        assert!("Inconnu".parse::<UserRole>().is_err());
        assert_eq!(serde_json::to_value(UserRole::Administrator).unwrap(), "ADMINISTRATOR");
    }

    #[test]
    fn timestamps_accept_backend_formats() {
        assert_eq!(timestamp::parse("2024-03-01T10:00:00"), Some(at(10, 0, 0)));
        assert_eq!(timestamp::parse("2024-03-01T10:00:00.000+00:00"), Some(at(10, 0, 0)));
        assert_eq!(timestamp::parse("2024-03-01T12:00:00+02:00"), Some(at(10, 0, 0)));
        assert_eq!(timestamp::parse("2024-03-01 10:00:00"), Some(at(10, 0, 0)));
        assert_eq!(timestamp::parse("yesterday"), None);

        let status: ChargePointStatus = serde_json::from_value(json!({
            "lastUpdate": 1709287200000i64,
            "error": null,
            "state": true,
            "step": "CONFIGURATION",
            "status": "PROCESSING"
        }))
        .unwrap();
        assert_eq!(status.last_update, at(10, 0, 0));
        assert_eq!(status.step, Step::Configuration);
        assert_eq!(status.status, StatusProcess::Processing);
    }

    #[test]
    fn charge_point_decodes_backend_payload() {
        let cp: ChargePoint = serde_json::from_value(json!({
            "id": 3,
            "serialNumberChargePoint": "SN-01",
            "type": "Borne",
            "constructor": "Alfen",
            "clientId": "cp-01",
            "configuration": null,
            "status": {
                "lastUpdate": "2024-03-01T10:00:00",
                "error": "",
                "state": false,
                "step": "FIRMWARE",
                "status": "PENDING"
            }
        }))
        .unwrap();
        assert_eq!(cp.serial_number, "SN-01");
        assert_eq!(cp.kind, "Borne");
        assert!(cp.configuration.is_none());
        assert_eq!(cp.status.unwrap().status, StatusProcess::Pending);

        let legacy: ChargePoint = serde_json::from_value(json!({
            "id": 4,
            "serialNumberChargepoint": "SN-02",
            "type": "Borne",
            "constructor": "Alfen",
            "clientId": "cp-02"
        }))
        .unwrap();
        assert_eq!(legacy.serial_number, "SN-02");
    }

    #[test]
    fn create_charge_point_uses_wire_names() {
        let body = serde_json::to_value(CreateChargePoint {
            serial_number: "SN-9".into(),
            kind: "Borne".into(),
            constructor: "Alfen".into(),
            client_id: "cp-9".into(),
            configuration: NO_CONFIGURATION,
        })
        .unwrap();
        assert_eq!(body["serialNumber"], "SN-9");
        assert_eq!(body["type"], "Borne");
        assert_eq!(body["clientId"], "cp-9");
        assert_eq!(body["configuration"], -1);
    }

    #[test]
    fn configuration_entries_are_escaped_json() {
        let heartbeat = Transcriptor {
            id: 2,
            full_name: "HeartbeatInterval".into(),
            regex: r"\d+".into(),
        };
        let label = Transcriptor {
            id: 7,
            full_name: "DisplayMessage".into(),
            regex: ".*".into(),
        };
        let create = CreateConfiguration::from_entries(
            "Default",
            "factory",
            "1.2",
            [(&heartbeat, "60"), (&label, "say \"hi\"")],
        );
        let parsed: BTreeMap<String, String> = serde_json::from_str(&create.configuration).unwrap();
        assert_eq!(parsed.get("2").map(String::as_str), Some("60"));
        assert_eq!(parsed.get("7").map(String::as_str), Some("say \"hi\""));
    }

    #[test]
    fn transcriptor_matches_whole_value() {
        let t = Transcriptor {
            id: 1,
            full_name: "HeartbeatInterval".into(),
            regex: r"\d+".into(),
        };
        assert!(t.accepts("60").unwrap());
        assert!(!t.accepts("60s").unwrap());
        let broken = Transcriptor {
            regex: "(".into(),
            ..t
        };
        assert!(broken.accepts("x").is_err());
    }

    #[test]
    fn notification_parses() {
        let n = ChargePointNotification::parse(
            r#"{"id":12,"status":{"lastUpdate":"2024-03-01T10:00:00","error":null,"state":true,"step":"FIRMWARE","status":"FINISHED"}}"#,
        )
        .unwrap();
        assert_eq!(n.id, 12);
        assert!(n.status.state);
        assert_eq!(n.status.status, StatusProcess::Finished);
    }

    #[test]
    fn configuration_entries_parse() {
        let cfg: Configuration = serde_json::from_value(json!({
            "id": 1,
            "name": "Default",
            "description": "",
            "lastEdit": "2024-03-01T10:00:00",
            "configuration": "{\"HeartbeatInterval\":\"60\"}",
            "firmware": { "id": 1, "url": "http://fw", "version": "1.2", "constructor": "Alfen", "typesAllowed": [] }
        }))
        .unwrap();
        let entries = cfg.entries().unwrap();
        assert_eq!(entries.get("HeartbeatInterval").map(String::as_str), Some("60"));
    }
}
