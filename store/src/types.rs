//! State slices of the application.
//!
//! Every slice serializes with camelCase keys. Those keys are the addressing
//! scheme of the legacy dotted-path interface (`calculator.orderValue`,
//! `customer.data.companyName`, ...), so renaming a field is a breaking
//! change for path callers.

use offerdesk_pricing::{PricingResult, Scenario};
use serde::{Deserialize, Deserializer, Serialize};

/// Deployment mode the application runs in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    /// Local development
    Development,
    /// Production deployment
    #[default]
    Production,
}

/// Application metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
    /// Application version string
    pub version: String,
    /// Set once the persisted state has been hydrated
    pub initialized: bool,
    /// Deployment mode
    pub environment: RuntimeMode,
}

impl AppInfo {
    /// Application version reported in `app.version`
    pub const VERSION: &'static str = "3.0.0";

    /// Metadata for a fresh, not yet hydrated application
    #[must_use]
    pub fn new(environment: RuntimeMode) -> Self {
        Self {
            version: Self::VERSION.to_string(),
            initialized: false,
            environment,
        }
    }
}

impl Default for AppInfo {
    fn default() -> Self {
        Self::new(RuntimeMode::default())
    }
}

/// Scenario inputs and the last computed pricing breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalculatorState {
    /// Order value in currency units
    #[serde(deserialize_with = "order_value_or_default")]
    pub order_value: f64,
    /// Lead time in days
    #[serde(deserialize_with = "lead_time_or_default")]
    pub lead_time: f64,
    /// Customer picks up the goods
    pub pickup: bool,
    /// Customer is a chain
    pub chain: bool,
    /// Last computed breakdown; stale until the next recompute
    pub calculation: Option<PricingResult>,
}

impl CalculatorState {
    /// Current inputs as a pricing scenario
    #[must_use]
    pub const fn scenario(&self) -> Scenario {
        Scenario::new(self.order_value, self.lead_time, self.pickup, self.chain)
    }
}

// Non-finite inputs are written as `null`; reading one back must not
// discard the rest of the snapshot.
fn order_value_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.unwrap_or_else(|| CalculatorState::default().order_value))
}

fn lead_time_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.unwrap_or_else(|| CalculatorState::default().lead_time))
}

impl Default for CalculatorState {
    fn default() -> Self {
        Self {
            order_value: 15_000.0,
            lead_time: 14.0,
            pickup: false,
            chain: false,
            calculation: None,
        }
    }
}

/// Kind of customer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerType {
    /// Single location
    #[default]
    Single,
    /// Chain with several locations
    Chain,
}

/// Customer master data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerData {
    /// Company name
    pub company_name: String,
    /// Contact name
    pub contact_name: String,
    /// Contact email
    pub contact_email: String,
    /// Contact phone
    pub contact_phone: String,
    /// Street
    pub street: String,
    /// Postal code
    pub postal_code: String,
    /// City
    pub city: String,
    /// Industry
    pub industry: String,
    /// Customer type
    pub customer_type: CustomerType,
}

/// Partial update of [`CustomerData`]; `None` fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerPatch {
    /// Company name
    pub company_name: Option<String>,
    /// Contact name
    pub contact_name: Option<String>,
    /// Contact email
    pub contact_email: Option<String>,
    /// Contact phone
    pub contact_phone: Option<String>,
    /// Street
    pub street: Option<String>,
    /// Postal code
    pub postal_code: Option<String>,
    /// City
    pub city: Option<String>,
    /// Industry
    pub industry: Option<String>,
    /// Customer type
    pub customer_type: Option<CustomerType>,
}

impl CustomerPatch {
    /// Shallow-merge the present fields into `data`
    pub fn apply(self, data: &mut CustomerData) {
        let fields = [
            (self.company_name, &mut data.company_name),
            (self.contact_name, &mut data.contact_name),
            (self.contact_email, &mut data.contact_email),
            (self.contact_phone, &mut data.contact_phone),
            (self.street, &mut data.street),
            (self.postal_code, &mut data.postal_code),
            (self.city, &mut data.city),
            (self.industry, &mut data.industry),
        ];
        for (value, target) in fields {
            if let Some(value) = value {
                *target = value;
            }
        }
        if let Some(customer_type) = self.customer_type {
            data.customer_type = customer_type;
        }
    }
}

/// Customer being quoted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerState {
    /// Master data, absent until first edited
    pub data: Option<CustomerData>,
    /// Customer type
    pub customer_type: CustomerType,
    /// Industry
    pub industry: String,
    /// Edited since the last save
    pub is_dirty: bool,
    /// Passed validation
    pub is_valid: bool,
}

impl Default for CustomerState {
    fn default() -> Self {
        Self {
            data: None,
            customer_type: CustomerType::Single,
            industry: String::new(),
            is_dirty: false,
            is_valid: true,
        }
    }
}

/// Contact details of the salesperson issuing offers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Salesperson {
    /// Name
    pub name: String,
    /// Email
    pub email: String,
    /// Phone
    pub phone: String,
    /// Mobile
    pub mobile: String,
}

/// Partial update of [`Salesperson`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SalespersonPatch {
    /// Name
    pub name: Option<String>,
    /// Email
    pub email: Option<String>,
    /// Phone
    pub phone: Option<String>,
    /// Mobile
    pub mobile: Option<String>,
}

impl SalespersonPatch {
    /// Shallow-merge the present fields into `salesperson`
    pub fn apply(self, salesperson: &mut Salesperson) {
        let fields = [
            (self.name, &mut salesperson.name),
            (self.email, &mut salesperson.email),
            (self.phone, &mut salesperson.phone),
            (self.mobile, &mut salesperson.mobile),
        ];
        for (value, target) in fields {
            if let Some(value) = value {
                *target = value;
            }
        }
    }
}

/// Default offer terms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OfferDefaults {
    /// Default discount in percent
    pub discount: u32,
    /// Default contract duration in months
    pub contract_duration: u32,
}

impl Default for OfferDefaults {
    fn default() -> Self {
        Self {
            discount: 15,
            contract_duration: 24,
        }
    }
}

/// monday.com credentials
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MondayIntegration {
    /// API token
    pub token: String,
    /// Board offers are pushed to
    pub board_id: String,
}

/// SMTP settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmailIntegration {
    /// SMTP host
    pub smtp_server: String,
    /// Sender address
    pub smtp_email: String,
    /// SMTP password
    pub smtp_password: String,
}

/// Xentral ERP credentials
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct XentralIntegration {
    /// API base URL
    pub url: String,
    /// API key
    pub key: String,
}

/// Third-party integration credentials
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Integrations {
    /// monday.com
    pub monday: MondayIntegration,
    /// Outgoing mail
    pub email: EmailIntegration,
    /// Xentral ERP
    pub xentral: XentralIntegration,
}

/// Partial update of one integration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "integration")]
pub enum IntegrationPatch {
    /// monday.com board sync
    #[serde(rename_all = "camelCase")]
    Monday {
        /// API token
        token: Option<String>,
        /// Board offers are pushed to
        board_id: Option<String>,
    },
    /// SMTP mail delivery
    #[serde(rename_all = "camelCase")]
    Email {
        /// SMTP host
        smtp_server: Option<String>,
        /// Sender address
        smtp_email: Option<String>,
        /// SMTP password
        smtp_password: Option<String>,
    },
    /// Xentral ERP
    #[serde(rename_all = "camelCase")]
    Xentral {
        /// API base URL
        url: Option<String>,
        /// API key
        key: Option<String>,
    },
}

impl IntegrationPatch {
    /// Shallow-merge the present fields into the matching integration
    pub fn apply(self, integrations: &mut Integrations) {
        fn merge(value: Option<String>, target: &mut String) {
            if let Some(value) = value {
                *target = value;
            }
        }

        match self {
            Self::Monday { token, board_id } => {
                merge(token, &mut integrations.monday.token);
                merge(board_id, &mut integrations.monday.board_id);
            },
            Self::Email {
                smtp_server,
                smtp_email,
                smtp_password,
            } => {
                merge(smtp_server, &mut integrations.email.smtp_server);
                merge(smtp_email, &mut integrations.email.smtp_email);
                merge(smtp_password, &mut integrations.email.smtp_password);
            },
            Self::Xentral { url, key } => {
                merge(url, &mut integrations.xentral.url);
                merge(key, &mut integrations.xentral.key);
            },
        }
    }
}

/// Salesperson, offer defaults and integrations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsState {
    /// Salesperson
    pub salesperson: Salesperson,
    /// Default offer terms
    pub defaults: OfferDefaults,
    /// Integrations
    pub integrations: Integrations,
}

/// Replaces whole settings sections; `None` sections are left alone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    /// Salesperson
    pub salesperson: Option<Salesperson>,
    /// Defaults
    pub defaults: Option<OfferDefaults>,
    /// Integrations
    pub integrations: Option<Integrations>,
}

/// Generated customer profile, a free-form document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileState {
    /// Profile document
    pub data: Option<serde_json::Value>,
}

/// Offer document state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PdfState {
    /// Offer generation is available
    pub available: bool,
    /// Last generated document
    #[serde(rename = "currentPDF")]
    pub current_pdf: Option<serde_json::Value>,
    /// File name of the current document
    pub filename: Option<String>,
}

impl Default for PdfState {
    fn default() -> Self {
        Self {
            available: true,
            current_pdf: None,
            filename: None,
        }
    }
}

/// Supported interface languages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// German
    #[default]
    De,
    /// English
    En,
}

/// Interface language selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct I18nState {
    /// Current language
    pub current_language: Language,
    /// Available languages
    pub available_languages: Vec<Language>,
    /// Re-render translations when the language changes
    pub auto_update: bool,
}

impl Default for I18nState {
    fn default() -> Self {
        Self {
            current_language: Language::De,
            available_languages: vec![Language::De, Language::En],
            auto_update: true,
        }
    }
}

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Operation succeeded
    Success,
    /// Operation failed
    Error,
    /// Needs attention
    Warning,
    /// Informational
    Info,
}

impl NotificationKind {
    /// Display duration in milliseconds used by the convenience constructors
    #[must_use]
    pub const fn default_duration_ms(self) -> u64 {
        match self {
            Self::Success | Self::Info => 3_000,
            Self::Warning => 4_000,
            Self::Error => 5_000,
        }
    }
}

/// A notification shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// `notif-<millis>-<suffix>`
    pub id: String,
    /// Severity
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Text shown to the user
    pub message: String,
    /// Auto-dismiss after this many milliseconds; `None` or 0 keeps it
    pub duration: Option<u64>,
    /// Creation time in Unix milliseconds
    pub timestamp: i64,
}

impl Notification {
    /// Whether the notification's display time has elapsed at `now_ms`
    #[must_use]
    pub fn is_expired(&self, now_ms: i64) -> bool {
        match self.duration {
            Some(duration) if duration > 0 => {
                let duration = i64::try_from(duration).unwrap_or(i64::MAX);
                now_ms.saturating_sub(self.timestamp) >= duration
            },
            _ => false,
        }
    }
}

/// A notification before it is assigned an id and timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    /// Severity
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Text shown to the user
    pub message: String,
    /// Auto-dismiss delay in milliseconds
    pub duration: Option<u64>,
}

impl NewNotification {
    /// Notification of `kind` with its default duration
    #[must_use]
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            duration: Some(kind.default_duration_ms()),
        }
    }

    /// Success notification
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, message)
    }

    /// Error notification
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, message)
    }

    /// Warning notification
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Warning, message)
    }

    /// Info notification
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, message)
    }

    /// Keep the notification until it is removed explicitly
    #[must_use]
    pub const fn sticky(mut self) -> Self {
        self.duration = None;
        self
    }
}

/// Session-only interface state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiState {
    /// Current tab
    pub current_tab: String,
    /// A long-running operation is in progress
    pub loading: bool,
    /// Message of the last failure
    pub error: Option<String>,
    /// Notifications
    pub notifications: Vec<Notification>,
}

impl UiState {
    /// Tab shown on start
    pub const DEFAULT_TAB: &'static str = "demonstrator";
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            current_tab: Self::DEFAULT_TAB.to_string(),
            loading: false,
            error: None,
            notifications: Vec::new(),
        }
    }
}

/// One delivery location of a chain customer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationData {
    /// Location label
    pub name: String,
    /// Street
    pub street: String,
    /// Postal code
    pub postal_code: String,
    /// City
    pub city: String,
    /// Contact name
    pub contact_name: String,
    /// Contact phone
    pub contact_phone: String,
    /// Contact email
    pub contact_email: String,
}

/// Delivery locations of the current customer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationsState {
    /// Captured locations
    pub locations: Vec<LocationData>,
    /// Declared number of locations
    pub total_locations: u32,
    /// Capture per-location details instead of a count
    pub capture_details: bool,
}

/// The whole application state tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppState {
    /// Application metadata, session-only
    pub app: AppInfo,
    /// Pricing scenario
    pub calculator: CalculatorState,
    /// Customer being quoted
    pub customer: CustomerState,
    /// User settings
    pub settings: SettingsState,
    /// Generated customer profile
    pub profile: ProfileState,
    /// Offer document, session-only
    pub pdf: PdfState,
    /// Language selection
    pub i18n: I18nState,
    /// Interface state, session-only
    pub ui: UiState,
    /// Delivery locations
    pub locations: LocationsState,
}

impl AppState {
    /// Initial state for `mode`
    #[must_use]
    pub fn new(mode: RuntimeMode) -> Self {
        Self {
            app: AppInfo::new(mode),
            ..Self::default()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_serialize_with_legacy_keys() {
        let value = serde_json::to_value(AppState::new(RuntimeMode::Development)).unwrap();

        assert_eq!(value["app"]["version"], "3.0.0");
        assert_eq!(value["app"]["environment"], "development");
        assert_eq!(value["calculator"]["orderValue"], 15_000.0);
        assert_eq!(value["calculator"]["leadTime"], 14.0);
        assert_eq!(value["calculator"]["calculation"], json!(null));
        assert_eq!(value["customer"]["customerType"], "single");
        assert_eq!(value["customer"]["isValid"], true);
        assert_eq!(value["settings"]["defaults"]["contractDuration"], 24);
        assert_eq!(value["settings"]["integrations"]["monday"]["boardId"], "");
        assert_eq!(value["pdf"]["currentPDF"], json!(null));
        assert_eq!(value["i18n"]["availableLanguages"], json!(["de", "en"]));
        assert_eq!(value["ui"]["currentTab"], "demonstrator");
        assert_eq!(value["locations"]["totalLocations"], 0);
    }

    #[test]
    fn customer_patch_merges_present_fields_only() {
        let mut data = CustomerData {
            company_name: "Alt GmbH".to_string(),
            city: "Berlin".to_string(),
            ..CustomerData::default()
        };

        CustomerPatch {
            company_name: Some("Neu GmbH".to_string()),
            customer_type: Some(CustomerType::Chain),
            ..CustomerPatch::default()
        }
        .apply(&mut data);

        assert_eq!(data.company_name, "Neu GmbH");
        assert_eq!(data.city, "Berlin");
        assert_eq!(data.customer_type, CustomerType::Chain);
    }

    #[test]
    fn integration_patch_targets_one_integration() {
        let mut integrations = Integrations::default();
        IntegrationPatch::Monday {
            token: Some("t".to_string()),
            board_id: None,
        }
        .apply(&mut integrations);

        assert_eq!(integrations.monday.token, "t");
        assert_eq!(integrations.monday.board_id, "");
        assert_eq!(integrations.email, EmailIntegration::default());
    }

    #[test]
    fn notification_expiry() {
        let notification = Notification {
            id: "notif-1-a".to_string(),
            kind: NotificationKind::Info,
            message: "hi".to_string(),
            duration: Some(3_000),
            timestamp: 1_000,
        };
        assert!(!notification.is_expired(3_999));
        assert!(notification.is_expired(4_000));

        let sticky = Notification {
            duration: None,
            ..notification
        };
        assert!(!sticky.is_expired(i64::MAX));
    }

    #[test]
    fn partial_slice_fills_missing_fields() {
        let calculator: CalculatorState =
            serde_json::from_value(json!({ "orderValue": 20000 })).unwrap();
        assert_eq!(calculator.order_value, 20_000.0);
        assert_eq!(calculator.lead_time, 14.0);
    }
}
