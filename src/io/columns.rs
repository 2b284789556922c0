//! Spreadsheet column schema.
//!
//! Import, export and the template share one fixed list of 45 labelled
//! columns. Export writes them in [`Column::ALL`] order; import locates them
//! by label, so column order in an imported file does not matter.

use crate::models::{ClientRecord, parse_yes, yes_no};

/// A spreadsheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum Column {
    FullName,
    Settlement,
    StreetType,
    Street,
    Building,
    BuildingLetter,
    Apartment,
    ApartmentLetter,
    AccountNumber,
    Eic,
    Phone,
    MeterBrand,
    MeterSize,
    MeterNumber,
    MeterYear,
    VerificationDate,
    NextVerificationDate,
    InstallationDate,
    MeterLocation,
    MeterGroup,
    MeterSubtype,
    MeterType,
    MeterOwnership,
    ServiceOrg,
    Mvnssh,
    Rsp,
    Seal,
    StickerSeal,
    BoilerBrand,
    BoilerPower,
    StoveType,
    StoveCount,
    ColumnType,
    ColumnCount,
    Area,
    UtilityType,
    UtilityGroup,
    Grs,
    GasDisconnected,
    DisconnectMethod,
    DisconnectSeal,
    DisconnectDate,
    ConnectDate,
    Dacha,
    TemporaryAbsent,
}

impl Column {
    /// Every column in export order.
    pub const ALL: [Self; 45] = [
        Self::FullName,
        Self::Settlement,
        Self::StreetType,
        Self::Street,
        Self::Building,
        Self::BuildingLetter,
        Self::Apartment,
        Self::ApartmentLetter,
        Self::AccountNumber,
        Self::Eic,
        Self::Phone,
        Self::MeterBrand,
        Self::MeterSize,
        Self::MeterNumber,
        Self::MeterYear,
        Self::VerificationDate,
        Self::NextVerificationDate,
        Self::InstallationDate,
        Self::MeterLocation,
        Self::MeterGroup,
        Self::MeterSubtype,
        Self::MeterType,
        Self::MeterOwnership,
        Self::ServiceOrg,
        Self::Mvnssh,
        Self::Rsp,
        Self::Seal,
        Self::StickerSeal,
        Self::BoilerBrand,
        Self::BoilerPower,
        Self::StoveType,
        Self::StoveCount,
        Self::ColumnType,
        Self::ColumnCount,
        Self::Area,
        Self::UtilityType,
        Self::UtilityGroup,
        Self::Grs,
        Self::GasDisconnected,
        Self::DisconnectMethod,
        Self::DisconnectSeal,
        Self::DisconnectDate,
        Self::ConnectDate,
        Self::Dacha,
        Self::TemporaryAbsent,
    ];

    /// Returns the column label used in spreadsheet headers.
    #[must_use]
    pub const fn header(self) -> &'static str {
        match self {
            Self::FullName => "ПІБ",
            Self::Settlement => "Населений пункт",
            Self::StreetType => "Тип вулиці",
            Self::Street => "Вулиця",
            Self::Building => "Будинок",
            Self::BuildingLetter => "Літера буд.",
            Self::Apartment => "Квартира",
            Self::ApartmentLetter => "Літера кв.",
            Self::AccountNumber => "Особовий рахунок",
            Self::Eic => "EIC",
            Self::Phone => "Телефон",
            Self::MeterBrand => "Марка лічильника",
            Self::MeterSize => "Типорозмір",
            Self::MeterNumber => "№ лічильника",
            Self::MeterYear => "Рік випуску",
            Self::VerificationDate => "Дата повірки",
            Self::NextVerificationDate => "Наступна повірка",
            Self::InstallationDate => "Дата встановлення",
            Self::MeterLocation => "Розташування лічильника",
            Self::MeterGroup => "Група ліч.",
            Self::MeterSubtype => "Підтип",
            Self::MeterType => "Тип ліч.",
            Self::MeterOwnership => "Належність",
            Self::ServiceOrg => "Серв.орган.",
            Self::Mvnssh => "МВНСШ",
            Self::Rsp => "РСП",
            Self::Seal => "Пломба",
            Self::StickerSeal => "Стікерна пломба",
            Self::BoilerBrand => "Котел марка",
            Self::BoilerPower => "Котел потужність",
            Self::StoveType => "Газова плита тип",
            Self::StoveCount => "Кількість плит",
            Self::ColumnType => "ВПГ тип",
            Self::ColumnCount => "Кількість ВПГ",
            Self::Area => "Площа",
            Self::UtilityType => "Комун. гос-во",
            Self::UtilityGroup => "Група",
            Self::Grs => "ГРС",
            Self::GasDisconnected => "Газ вимкнено",
            Self::DisconnectMethod => "Метод відключення",
            Self::DisconnectSeal => "Пломба відкл.",
            Self::DisconnectDate => "Дата відкл.",
            Self::ConnectDate => "Дата підкл.",
            Self::Dacha => "Дача",
            Self::TemporaryAbsent => "Тимчасово відсутній",
        }
    }

    /// Finds a column by its label. Surrounding whitespace is ignored.
    #[must_use]
    pub fn from_header(header: &str) -> Option<Self> {
        let header = header.trim();
        Self::ALL.into_iter().find(|c| c.header() == header)
    }

    /// Whether the column holds a yes/no flag.
    #[must_use]
    pub const fn is_flag(self) -> bool {
        matches!(self, Self::Dacha | Self::TemporaryAbsent)
    }

    /// Renders the column's value for `record`. Flags render as the yes/no
    /// markers.
    #[must_use]
    pub fn value(self, record: &ClientRecord) -> String {
        match self {
            Self::Dacha => yes_no(record.dacha).to_string(),
            Self::TemporaryAbsent => yes_no(record.temporary_absent).to_string(),
            _ => self.text(record).map(String::clone).unwrap_or_default(),
        }
    }

    /// Assigns a cell value to `record`, trimming it first.
    pub fn assign(self, record: &mut ClientRecord, value: &str) {
        let value = value.trim();
        match self {
            Self::Dacha => record.dacha = parse_yes(value),
            Self::TemporaryAbsent => record.temporary_absent = parse_yes(value),
            _ => {
                if let Some(field) = self.text_mut(record) {
                    value.clone_into(field);
                }
            },
        }
    }

    fn text(self, record: &ClientRecord) -> Option<&String> {
        Some(match self {
            Self::FullName => &record.full_name,
            Self::Settlement => &record.settlement,
            Self::StreetType => &record.street_type,
            Self::Street => &record.street,
            Self::Building => &record.building,
            Self::BuildingLetter => &record.building_letter,
            Self::Apartment => &record.apartment,
            Self::ApartmentLetter => &record.apartment_letter,
            Self::AccountNumber => &record.account_number,
            Self::Eic => &record.eic,
            Self::Phone => &record.phone,
            Self::MeterBrand => &record.meter_brand,
            Self::MeterSize => &record.meter_size,
            Self::MeterNumber => &record.meter_number,
            Self::MeterYear => &record.meter_year,
            Self::VerificationDate => &record.verification_date,
            Self::NextVerificationDate => &record.next_verification_date,
            Self::InstallationDate => &record.installation_date,
            Self::MeterLocation => &record.meter_location,
            Self::MeterGroup => &record.meter_group,
            Self::MeterSubtype => &record.meter_subtype,
            Self::MeterType => &record.meter_type,
            Self::MeterOwnership => &record.meter_ownership,
            Self::ServiceOrg => &record.service_org,
            Self::Mvnssh => &record.mvnssh,
            Self::Rsp => &record.rsp,
            Self::Seal => &record.seal,
            Self::StickerSeal => &record.sticker_seal,
            Self::BoilerBrand => &record.boiler_brand,
            Self::BoilerPower => &record.boiler_power,
            Self::StoveType => &record.stove_type,
            Self::StoveCount => &record.stove_count,
            Self::ColumnType => &record.column_type,
            Self::ColumnCount => &record.column_count,
            Self::Area => &record.area,
            Self::UtilityType => &record.utility_type,
            Self::UtilityGroup => &record.utility_group,
            Self::Grs => &record.grs,
            Self::GasDisconnected => &record.gas_disconnected,
            Self::DisconnectMethod => &record.disconnect_method,
            Self::DisconnectSeal => &record.disconnect_seal,
            Self::DisconnectDate => &record.disconnect_date,
            Self::ConnectDate => &record.connect_date,
            Self::Dacha | Self::TemporaryAbsent => return None,
        })
    }

    fn text_mut(self, record: &mut ClientRecord) -> Option<&mut String> {
        Some(match self {
            Self::FullName => &mut record.full_name,
            Self::Settlement => &mut record.settlement,
            Self::StreetType => &mut record.street_type,
            Self::Street => &mut record.street,
            Self::Building => &mut record.building,
            Self::BuildingLetter => &mut record.building_letter,
            Self::Apartment => &mut record.apartment,
            Self::ApartmentLetter => &mut record.apartment_letter,
            Self::AccountNumber => &mut record.account_number,
            Self::Eic => &mut record.eic,
            Self::Phone => &mut record.phone,
            Self::MeterBrand => &mut record.meter_brand,
            Self::MeterSize => &mut record.meter_size,
            Self::MeterNumber => &mut record.meter_number,
            Self::MeterYear => &mut record.meter_year,
            Self::VerificationDate => &mut record.verification_date,
            Self::NextVerificationDate => &mut record.next_verification_date,
            Self::InstallationDate => &mut record.installation_date,
            Self::MeterLocation => &mut record.meter_location,
            Self::MeterGroup => &mut record.meter_group,
            Self::MeterSubtype => &mut record.meter_subtype,
            Self::MeterType => &mut record.meter_type,
            Self::MeterOwnership => &mut record.meter_ownership,
            Self::ServiceOrg => &mut record.service_org,
            Self::Mvnssh => &mut record.mvnssh,
            Self::Rsp => &mut record.rsp,
            Self::Seal => &mut record.seal,
            Self::StickerSeal => &mut record.sticker_seal,
            Self::BoilerBrand => &mut record.boiler_brand,
            Self::BoilerPower => &mut record.boiler_power,
            Self::StoveType => &mut record.stove_type,
            Self::StoveCount => &mut record.stove_count,
            Self::ColumnType => &mut record.column_type,
            Self::ColumnCount => &mut record.column_count,
            Self::Area => &mut record.area,
            Self::UtilityType => &mut record.utility_type,
            Self::UtilityGroup => &mut record.utility_group,
            Self::Grs => &mut record.grs,
            Self::GasDisconnected => &mut record.gas_disconnected,
            Self::DisconnectMethod => &mut record.disconnect_method,
            Self::DisconnectSeal => &mut record.disconnect_seal,
            Self::DisconnectDate => &mut record.disconnect_date,
            Self::ConnectDate => &mut record.connect_date,
            Self::Dacha | Self::TemporaryAbsent => return None,
        })
    }
}

/// Header labels in export order.
#[must_use]
pub fn headers() -> Vec<&'static str> {
    Column::ALL.iter().map(|c| c.header()).collect()
}

/// Renders a record as one row in export order.
#[must_use]
pub fn record_to_row(record: &ClientRecord) -> Vec<String> {
    Column::ALL.iter().map(|c| c.value(record)).collect()
}
