//! Client record types and identifiers.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Affirmative marker used by the registry for yes/no columns.
pub const YES: &str = "Так";

/// Negative marker used by the registry for yes/no columns.
pub const NO: &str = "Ні";

/// Store-assigned identifier of a client record.
///
/// Ids increase monotonically and are never reused after deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(i64);

impl ClientId {
    /// Creates a client ID from its raw value.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ClientId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl FromStr for ClientId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|e| Error::InvalidInput(format!("invalid client id '{s}': {e}")))
    }
}

/// A subscriber record.
///
/// Every text field defaults to an empty string so matching and
/// concatenation never need to special-case absent values. Dates are kept as
/// the display strings the operator typed (`DD.MM.YYYY` in practice).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientRecord {
    /// Store-assigned id; `None` until the record is created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ClientId>,

    // Identity
    /// Full name (required).
    pub full_name: String,
    /// Personal account number (required, business key).
    pub account_number: String,

    // Address
    /// Settlement (town or village).
    pub settlement: String,
    /// Street type abbreviation (`вул.`, `пров.`, ...).
    pub street_type: String,
    /// Street name.
    pub street: String,
    /// Building number.
    pub building: String,
    /// Building letter.
    pub building_letter: String,
    /// Apartment number.
    pub apartment: String,
    /// Apartment letter.
    pub apartment_letter: String,

    // Contact
    /// Phone number(s), comma-separated when there are several.
    pub phone: String,
    /// Energy identification code.
    pub eic: String,

    // Meter
    /// Meter brand.
    pub meter_brand: String,
    /// Meter size (`G1.6`, `G4`, ...).
    pub meter_size: String,
    /// Meter serial number.
    pub meter_number: String,
    /// Meter manufacturing year.
    pub meter_year: String,
    /// Date of the last verification.
    pub verification_date: String,
    /// Date of the next verification.
    pub next_verification_date: String,
    /// Installation date.
    pub installation_date: String,
    /// Where the meter is installed.
    pub meter_location: String,
    /// Meter group.
    pub meter_group: String,
    /// Meter subtype.
    pub meter_subtype: String,
    /// Meter type.
    pub meter_type: String,
    /// Meter ownership.
    pub meter_ownership: String,
    /// Servicing organisation.
    pub service_org: String,
    /// МВНСШ value.
    pub mvnssh: String,
    /// РСП value.
    pub rsp: String,
    /// Seal number.
    pub seal: String,
    /// Sticker seal number.
    pub sticker_seal: String,

    // Appliances
    /// Boiler brand.
    pub boiler_brand: String,
    /// Boiler power.
    pub boiler_power: String,
    /// Gas stove type.
    pub stove_type: String,
    /// Number of gas stoves.
    pub stove_count: String,
    /// Water heater (column) type.
    pub column_type: String,
    /// Number of water heaters.
    pub column_count: String,

    // Utility / status
    /// Heated area.
    pub area: String,
    /// Utility household type.
    pub utility_type: String,
    /// Utility group.
    pub utility_group: String,
    /// Gas distribution station.
    pub grs: String,
    /// `Так` when gas is disconnected.
    pub gas_disconnected: String,
    /// How the supply was disconnected.
    pub disconnect_method: String,
    /// Seal applied on disconnection.
    pub disconnect_seal: String,
    /// Disconnection date.
    pub disconnect_date: String,
    /// Reconnection date.
    pub connect_date: String,
    /// Seasonal property.
    pub dacha: bool,
    /// Subscriber temporarily absent.
    pub temporary_absent: bool,
}

impl ClientRecord {
    /// Creates a record with the two required fields set.
    #[must_use]
    pub fn new(account_number: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            account_number: account_number.into(),
            full_name: full_name.into(),
            ..Default::default()
        }
    }

    /// Sets the id.
    #[must_use]
    pub const fn with_id(mut self, id: ClientId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the settlement.
    #[must_use]
    pub fn with_settlement(mut self, settlement: impl Into<String>) -> Self {
        self.settlement = settlement.into();
        self
    }

    /// Sets street type and street name.
    #[must_use]
    pub fn with_street(mut self, street_type: impl Into<String>, street: impl Into<String>) -> Self {
        self.street_type = street_type.into();
        self.street = street.into();
        self
    }

    /// Sets meter brand, size and year.
    #[must_use]
    pub fn with_meter(
        mut self,
        brand: impl Into<String>,
        size: impl Into<String>,
        year: impl Into<String>,
    ) -> Self {
        self.meter_brand = brand.into();
        self.meter_size = size.into();
        self.meter_year = year.into();
        self
    }

    /// Sets the phone field.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    /// Street name used as the display and filter key: type and name joined
    /// by a space, empty parts omitted.
    #[must_use]
    pub fn street_name(&self) -> String {
        match (self.street_type.is_empty(), self.street.is_empty()) {
            (false, false) => format!("{} {}", self.street_type, self.street),
            (false, true) => self.street_type.clone(),
            (true, false) => self.street.clone(),
            (true, true) => String::new(),
        }
    }

    /// Whether the gas supply is marked as disconnected.
    #[must_use]
    pub fn is_disconnected(&self) -> bool {
        self.gas_disconnected == YES
    }

    /// Checks the required fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] naming every blank required field.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.account_number.trim().is_empty() {
            missing.push("account number");
        }
        if self.full_name.trim().is_empty() {
            missing.push("full name");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidInput(format!(
                "required fields are empty: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Renders a boolean as the registry's yes/no marker.
#[must_use]
pub const fn yes_no(value: bool) -> &'static str {
    if value { YES } else { NO }
}

/// Interprets a yes/no cell.
///
/// Accepts the affirmative marker `Так` exactly (after trimming) or the
/// word `true` in any ASCII case. Spreadsheet native booleans arrive as
/// `true`; the case-insensitive match is intentionally wider than an exact
/// `true` so hand-edited CSV and JSON files with `TRUE` or `True` also count.
/// The marker itself stays case-sensitive: `так` is not affirmative.
#[must_use]
pub fn parse_yes(value: &str) -> bool {
    let value = value.trim();
    value == YES || value.eq_ignore_ascii_case("true")
}
