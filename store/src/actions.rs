//! Actions accepted by the application store.
//!
//! One variant group per slice, one concern per variant. Variants carry typed
//! values; the legacy path adapter is the only place that converts loose JSON
//! into these.

use crate::types::{
    CustomerPatch, CustomerType, IntegrationPatch, Language, LocationData, NewNotification,
    SalespersonPatch, SettingsPatch,
};
use offerdesk_pricing::PricingResult;

/// Every action the store accepts
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    /// Calculator slice
    Calculator(CalculatorAction),
    /// Customer slice
    Customer(CustomerAction),
    /// Locations slice
    Locations(LocationsAction),
    /// Settings slice
    Settings(SettingsAction),
    /// Profile slice
    Profile(ProfileAction),
    /// PDF slice
    Pdf(PdfAction),
    /// Language slice
    I18n(I18nAction),
    /// Interface slice
    Ui(UiAction),
    /// Replace the whole tree with the initial state
    Reset,
    /// Mark the persisted state as loaded
    Hydrate,
}

/// How the stored pricing breakdown is updated
#[derive(Debug, Clone, PartialEq)]
pub enum CalculationUpdate {
    /// Recompute from the current calculator inputs
    Recompute,
    /// Store the given breakdown as-is
    Replace(Option<PricingResult>),
}

/// A single calculator input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScenarioInput {
    /// Order value
    OrderValue(f64),
    /// Lead time in days
    LeadTime(f64),
    /// Pickup flag
    Pickup(bool),
    /// Chain flag
    Chain(bool),
}

/// Calculator actions
///
/// The plain setters never touch `calculation`; callers batch several of them
/// and recompute once. [`CalculatorAction::Adjust`] sets one input and then
/// recomputes.
#[derive(Debug, Clone, PartialEq)]
pub enum CalculatorAction {
    /// Set the order value
    SetOrderValue(f64),
    /// Set the lead time
    SetLeadTime(f64),
    /// Set the pickup flag
    SetPickup(bool),
    /// Set the chain flag
    SetChain(bool),
    /// Update the stored breakdown
    UpdateCalculation(CalculationUpdate),
    /// Set one input, then recompute
    Adjust(ScenarioInput),
}

/// Customer actions
#[derive(Debug, Clone, PartialEq)]
pub enum CustomerAction {
    /// Merge into the customer record, creating an empty one if absent
    SetCustomerData(CustomerPatch),
    /// Set the customer type, mirrored into the record
    SetCustomerType(CustomerType),
    /// Set the industry, mirrored into the record
    SetIndustry(String),
    /// Clear the dirty flag
    Save,
    /// Reset the slice
    Clear,
    /// Merge into the customer record, seeding a new one from the current
    /// industry and type
    Update(CustomerPatch),
}

/// Location actions
#[derive(Debug, Clone, PartialEq)]
pub enum LocationsAction {
    /// Replace the location list
    UpdateLocations(Vec<LocationData>),
    /// Set the declared location count
    SetTotalLocations(u32),
    /// Toggle per-location capture
    SetCaptureDetails(bool),
}

/// Settings actions
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsAction {
    /// Replace whole settings sections
    Update(SettingsPatch),
    /// Merge into the salesperson details
    UpdateSalesperson(SalespersonPatch),
    /// Merge into one integration
    UpdateIntegration(IntegrationPatch),
}

/// Profile actions
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileAction {
    /// Replace the profile document
    SetProfileData(Option<serde_json::Value>),
    /// Request profile generation
    GenerateProfile,
}

/// PDF actions
#[derive(Debug, Clone, PartialEq)]
pub enum PdfAction {
    /// Set whether offer generation is available
    SetAvailable(bool),
    /// Store a generated document
    SetCurrent {
        /// Document payload
        document: serde_json::Value,
        /// File name
        filename: String,
    },
    /// Drop the current document
    Clear,
}

/// Language actions
#[derive(Debug, Clone, PartialEq)]
pub enum I18nAction {
    /// Switch the interface language
    SetLanguage(Language),
    /// Flip the auto-update flag
    ToggleAutoUpdate,
}

/// Interface actions
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    /// Switch tab
    SetCurrentTab(String),
    /// Set the loading flag
    SetLoading(bool),
    /// Set or clear the error message
    SetError(Option<String>),
    /// Clear the error message
    ClearError,
    /// Show a notification
    AddNotification(NewNotification),
    /// Remove a notification by id
    RemoveNotification(String),
    /// Remove every notification
    ClearNotifications,
    /// Remove notifications whose duration has elapsed
    PruneExpiredNotifications,
}

impl From<CalculatorAction> for AppAction {
    fn from(action: CalculatorAction) -> Self {
        Self::Calculator(action)
    }
}

impl From<CustomerAction> for AppAction {
    fn from(action: CustomerAction) -> Self {
        Self::Customer(action)
    }
}

impl From<LocationsAction> for AppAction {
    fn from(action: LocationsAction) -> Self {
        Self::Locations(action)
    }
}

impl From<SettingsAction> for AppAction {
    fn from(action: SettingsAction) -> Self {
        Self::Settings(action)
    }
}

impl From<ProfileAction> for AppAction {
    fn from(action: ProfileAction) -> Self {
        Self::Profile(action)
    }
}

impl From<PdfAction> for AppAction {
    fn from(action: PdfAction) -> Self {
        Self::Pdf(action)
    }
}

impl From<I18nAction> for AppAction {
    fn from(action: I18nAction) -> Self {
        Self::I18n(action)
    }
}

impl From<UiAction> for AppAction {
    fn from(action: UiAction) -> Self {
        Self::Ui(action)
    }
}
