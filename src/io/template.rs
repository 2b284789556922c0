//! Import template.
//!
//! A file with the header row and one fully populated example row, handed
//! to operators as the starting point for bulk imports.

use super::formats::xlsx::XlsxExportSink;
use super::formats::{Format, create_export_sink};
use super::traits::ExportSink;
use crate::Result;
use crate::models::{ClientRecord, NO};
use std::io::Write;

/// File name of the workbook template.
pub const TEMPLATE_FILE_NAME: &str = "Шаблон_Абоненти.xlsx";

/// Worksheet name of the workbook template.
pub const TEMPLATE_SHEET_NAME: &str = "Шаблон";

/// The example record written to the template.
#[must_use]
pub fn template_record() -> ClientRecord {
    ClientRecord {
        id: None,
        full_name: "Іванов Іван Іванович".to_string(),
        account_number: "1234567890".to_string(),
        settlement: "Київ".to_string(),
        street_type: "вул.".to_string(),
        street: "Хрещатик".to_string(),
        building: "1".to_string(),
        building_letter: "А".to_string(),
        apartment: "10".to_string(),
        apartment_letter: String::new(),
        phone: "+380501234567".to_string(),
        eic: "12345678901234567890".to_string(),
        meter_brand: "Metrix".to_string(),
        meter_size: "G4".to_string(),
        meter_number: "МТ123456".to_string(),
        meter_year: "2020".to_string(),
        verification_date: "01.01.2020".to_string(),
        next_verification_date: "01.01.2030".to_string(),
        installation_date: "15.01.2020".to_string(),
        meter_location: "Кухня".to_string(),
        meter_group: "Група 1".to_string(),
        meter_subtype: "Мембранний".to_string(),
        meter_type: "Побутовий".to_string(),
        meter_ownership: "Абонент".to_string(),
        service_org: "Сервіс-1".to_string(),
        mvnssh: "10".to_string(),
        rsp: "РСП-1".to_string(),
        seal: "№123456".to_string(),
        sticker_seal: "№789012".to_string(),
        boiler_brand: "Ariston".to_string(),
        boiler_power: "24 кВт".to_string(),
        stove_type: "ПГ-4".to_string(),
        stove_count: "1".to_string(),
        column_type: "ВПГ-10".to_string(),
        column_count: "1".to_string(),
        area: "65.5".to_string(),
        utility_type: "Квартира".to_string(),
        utility_group: "Багатоквартирний".to_string(),
        grs: "ГРС-1".to_string(),
        gas_disconnected: NO.to_string(),
        disconnect_method: String::new(),
        disconnect_seal: String::new(),
        disconnect_date: String::new(),
        connect_date: String::new(),
        dacha: false,
        temporary_absent: false,
    }
}

/// Writes the template in `format`.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_template<W: Write + Send + 'static>(writer: W, format: Format) -> Result<()> {
    let mut sink: Box<dyn ExportSink> = match format {
        Format::Xlsx => Box::new(XlsxExportSink::with_sheet_name(
            writer,
            TEMPLATE_SHEET_NAME,
        )?),
        other => create_export_sink(writer, other)?,
    };
    sink.write(&template_record())?;
    sink.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::formats::csv::CsvImportSource;
    use crate::io::formats::xlsx::XlsxImportSource;
    use crate::io::traits::ImportSource;
    use std::io::Cursor;

    #[test]
    fn test_template_is_valid() {
        assert!(template_record().validate().is_ok());
    }

    #[test]
    fn test_workbook_template_reimports_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(TEMPLATE_FILE_NAME);
        let file = std::fs::File::create(&path).unwrap();
        write_template(file, Format::Xlsx).unwrap();

        let mut source = XlsxImportSource::new(std::fs::File::open(&path).unwrap()).unwrap();
        assert_eq!(source.size_hint(), Some(1));
        let record = source.next().unwrap().unwrap().to_record();
        assert_eq!(record, template_record());
    }

    #[test]
    fn test_csv_template_reimports_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Шаблон_Абоненти.csv");
        let file = std::fs::File::create(&path).unwrap();
        write_template(file, Format::Csv).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let mut source = CsvImportSource::new(Cursor::new(bytes)).unwrap();
        let record = source.next().unwrap().unwrap().to_record();
        assert_eq!(record, template_record());
        assert!(source.next().unwrap().is_none());
    }
}
