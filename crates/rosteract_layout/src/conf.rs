//! Act constants, column catalogs and default preset factories.

use crate::spec::{
    EnumActShape, EnumColumnKey, EnumRecordField, SpecCellFormat, SpecColumn, SpecPageMargins,
    SpecPageSetup,
};

////////////////////////////////////////////////////////////////////////////////
// #region Labels

/// Note seeded for every imported record.
pub const C_LABEL_SELECTED: &str = "Відібраний";
/// Assessment of a selected record.
pub const C_ASSESSMENT_MEETS: &str = "відповідає вимогам";
/// Assessment of a rejected record.
pub const C_ASSESSMENT_FAILS: &str = "не відповідає вимогам";
/// Fixed `mps` column value.
pub const C_MPS_DEFAULT: &str = "задовільний";
/// Rendered in place of a missing order date.
pub const C_ORDER_DATE_PLACEHOLDER: &str = "___.____________.20___ р.";

pub const C_SHEET_NAME: &str = "Додаток 4";
pub const C_TITLE_ANNEX: &str = "Додаток 1";
pub const C_TITLE_COPY: &str = "Примірник 2";
pub const C_TITLE_ACT: &str = "АКТ";

pub const C_APPROVAL_LABEL: &str = "ЗАТВЕРДЖУЮ";
pub const C_APPROVER_POSITION: &str = "Командир військової частини А4152";
pub const C_APPROVER_RANK: &str = "полковник";
pub const C_APPROVER_NAME: &str = "Вадим ГАЙДЕЙ";
/// Slots: `{year}`.
pub const C_APPROVAL_DATE_TEMPLATE: &str = "____._______________ {year} р.";

/// Slots: `{unit}`, `{order_date}`, `{order_number}`.
pub const C_DESCRIPTION_RECEIVING_TEMPLATE: &str = "прийому військовонавченого ресурсу з військової частини А4152 (233 ЦПП) для доукомплектування військової частини {unit},\nвідповідно до розпорядження Генерального штабу ЗС України від {order_date} {order_number}";
/// Slots: `{unit}`, `{order_date}`, `{order_number}`.
pub const C_DESCRIPTION_COMMISSION_TEMPLATE: &str = "роботи кваліфікаційної комісії військової частини А4152 щодо формування іменних списків на поповнення військової частини {unit},\nвідповідно до розпорядження Генерального штабу ЗС України від {order_date} {order_number}";

/// Slots: `{count}`.
pub const C_SUMMARY_RECEIVING_TOTAL_TEMPLATE: &str =
    "Представлено для вивчення (огляду) {count} військовослужбовців";
/// Slots: `{count}`.
pub const C_SUMMARY_RECEIVING_SELECTED_TEMPLATE: &str = "Відібрано {count} військовослужбовців";
pub const C_SUMMARY_COMMISSION_TOTAL: &str = "Підлягало для відбору";
pub const C_SUMMARY_COMMISSION_SELECTED: &str = "Відібрано";
pub const C_SUMMARY_COMMISSION_REJECTED: &str = "Невідібрано";
/// Slots: `{count}`.
pub const C_SUMMARY_COMMISSION_COUNT_TEMPLATE: &str =
    "{count} військовослужбовців (службових документів на них)";

pub const C_SIGNATURE_LINE: &str = "_______________________";
/// Marks a signature kept on file in the copy variant.
pub const C_SIGNATURE_ON_FILE: &str = "ОП";
pub const C_SIGNATURE_CAPTION: &str = "(підпис)";
pub const C_ACQUAINTANCE_LABEL: &str =
    "Ознайомлення з Актом представника військової частини А7384";

/// Commission signatories `(role, rank and name)`; blank role continues the previous one.
pub const TUP_COMMISSION_SIGNATORIES: [(&str, &str); 6] = [
    ("Старший комісії:", "полковник Дмитро ЛОСІНЕЦЬ"),
    ("Члени комісії:", "майор Сергій МАТВІЙЧУК"),
    ("", "капітан м/с Арсен КОВАЛЬЧУК"),
    ("", "старший лейтенант Андрій ШЕЛЕСТЮК"),
    ("", "молодший лейтенант Володимир ФЕДІНЧИК"),
    ("Секретар комісії:", "майор Олег КОТИК"),
];

/// Slots: `{date}`, `{unit}`.
pub const C_FILE_NAME_RECEIVING_TEMPLATE: &str =
    "Додаток 1 до Алгоритму дій посадових осіб {date}({unit}).xlsx";
/// Slots: `{date}`, `{unit}`.
pub const C_FILE_NAME_COMMISSION_TEMPLATE: &str = "Додаток 1 {date}({unit}).xlsx";
/// Slots: `{date}`, `{unit}`.
pub const C_FILE_NAME_COMMISSION_COPY_TEMPLATE: &str = "Додаток 1 {date}({unit}) (примірник).xlsx";
/// Slots: `{date}`, `{unit}`.
pub const C_ARCHIVE_NAME_TEMPLATE: &str = "Акти {date}({unit}).zip";

/// Genitive month names used in long-form dates.
pub const TUP_MONTHS_GENITIVE_UK: [&str; 12] = [
    "січня",
    "лютого",
    "березня",
    "квітня",
    "травня",
    "червня",
    "липня",
    "серпня",
    "вересня",
    "жовтня",
    "листопада",
    "грудня",
];

/// Characters not allowed in archive entry names.
pub const TUP_FILE_NAME_ILLEGAL: [&str; 9] = ["/", "\\", ":", "*", "?", "\"", "<", ">", "|"];

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Geometry

pub const C_FONT_NAME: &str = "Times New Roman";
pub const N_FONT_SIZE: i64 = 14;
/// Height of a wrapped row with no text.
pub const N_ROW_HEIGHT_EMPTY: f64 = 15.0;
/// Characters per line per unit of column width.
pub const N_ROW_CHARS_PER_WIDTH: f64 = 1.2;
/// Line height on top of the font size.
pub const N_ROW_LINE_PADDING: f64 = 2.0;
/// Excel paper size code for A4.
pub const N_PAPER_SIZE_A4: u8 = 9;
pub const N_SHEET_ZOOM: u16 = 80;
/// Header row number of the source roster.
pub const N_SOURCE_HEADER_ROW: u32 = 1;

/// Source roster header labels.
pub const TUP_SOURCE_COLUMNS: [(EnumRecordField, &str); 7] = [
    (EnumRecordField::Index, "№ з/п"),
    (EnumRecordField::Rank, "В/звання"),
    (EnumRecordField::Name, "Прізвище, ім'я та по-батькові"),
    (EnumRecordField::Birthday, "ДН"),
    (EnumRecordField::Age, "Вік"),
    (EnumRecordField::MedicalCommission, "Відомість про ВЛК"),
    (EnumRecordField::MobilizationUnit, "Ким мобілізований"),
];

/// Receiving act columns `(key, label, width)`.
pub const TUP_RECEIVING_COLUMNS: [(EnumColumnKey, &str, f64); 9] = [
    (EnumColumnKey::Index, "№", 5.89),
    (EnumColumnKey::Rank, "Військове звання", 13.78),
    (EnumColumnKey::Name, "Прізвище ім’я", 43.44),
    (EnumColumnKey::Birthday, "Дата народження", 18.11),
    (EnumColumnKey::Age, "Вік", 14.22),
    (EnumColumnKey::MedicalCommission, "Висновок ВЛК дата, номер", 34.22),
    (EnumColumnKey::MobilizationUnit, "Призваний яким ТЦК та СП", 30.78),
    (
        EnumColumnKey::Note,
        "Примітка\n(відібраний або відмова у отриманні з зазначеням причини)",
        26.22,
    ),
    (
        EnumColumnKey::Signature,
        "Підпис представника військової частини, яка приймає особивий склад ",
        21.89,
    ),
];

/// Commission act columns `(key, label, width)`.
pub const TUP_COMMISSION_COLUMNS: [(EnumColumnKey, &str, f64); 10] = [
    (EnumColumnKey::Index, "№", 5.89),
    (EnumColumnKey::Rank, "Військове звання", 20.33),
    (EnumColumnKey::Name, "Прізвище ім’я", 54.78),
    (EnumColumnKey::Birthday, "Дата народження", 18.11),
    (EnumColumnKey::Age, "Вік", 14.22),
    (EnumColumnKey::MedicalCommission, "Висновок ВЛК дата, номер", 34.22),
    (EnumColumnKey::Mps, "МПС", 16.33),
    (EnumColumnKey::MobilizationUnit, "Призваний яким ТЦК та СП", 30.78),
    (EnumColumnKey::Assessment, "Оцінка відповідності", 27.12),
    (EnumColumnKey::Note, "Причини відмови", 19.0),
];

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PresetFactories

/// Column catalog of `shape` with 1-based positions.
pub fn derive_shape_columns(shape: EnumActShape) -> Vec<SpecColumn> {
    let l_catalog: &[(EnumColumnKey, &str, f64)] = match shape {
        EnumActShape::Receiving => &TUP_RECEIVING_COLUMNS,
        EnumActShape::Commission | EnumActShape::CommissionCopy => &TUP_COMMISSION_COLUMNS,
    };
    l_catalog
        .iter()
        .enumerate()
        .map(|(n_idx, (key, label, width))| SpecColumn {
            key: *key,
            label: label.to_string(),
            width: *width,
            position: n_idx as u32 + 1,
        })
        .collect()
}

/// Default font applied to every column.
pub fn derive_default_column_format() -> SpecCellFormat {
    SpecCellFormat {
        font_name: Some(C_FONT_NAME.to_string()),
        font_size: Some(N_FONT_SIZE),
        ..Default::default()
    }
}

/// Print setup of `shape`: A4 landscape, one page wide.
pub fn derive_default_page_setup(shape: EnumActShape) -> SpecPageSetup {
    let margins = match shape {
        EnumActShape::Receiving => SpecPageMargins {
            left: 0.5,
            right: 0.5,
            top: 1.0,
            bottom: 0.5,
            header: 0.3,
            footer: 0.3,
        },
        EnumActShape::Commission | EnumActShape::CommissionCopy => SpecPageMargins {
            left: 0.3,
            right: 0.3,
            top: 0.3,
            bottom: 0.3,
            header: 0.3,
            footer: 0.3,
        },
    };
    SpecPageSetup {
        paper_size: N_PAPER_SIZE_A4,
        if_landscape: true,
        fit_to_width: 1,
        fit_to_height: 0,
        margins,
        zoom: N_SHEET_ZOOM,
        if_page_break_preview: true,
    }
}

/// Thin border on all four sides.
pub fn derive_border_format() -> SpecCellFormat {
    SpecCellFormat {
        border: Some(1),
        ..Default::default()
    }
}

/// Horizontal alignment only.
pub fn derive_align_format(align: &str) -> SpecCellFormat {
    SpecCellFormat {
        align: Some(align.to_string()),
        ..Default::default()
    }
}

/// Centered, vertically middle, wrapped.
pub fn derive_wrapped_center_format() -> SpecCellFormat {
    SpecCellFormat {
        align: Some("center".to_string()),
        valign: Some("vcenter".to_string()),
        text_wrap: Some(true),
        ..Default::default()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
