//! Derived field resolver: counts, assessment phrases and formatted dates.

use chrono::NaiveDate;

use crate::conf::{
    C_ASSESSMENT_FAILS, C_ASSESSMENT_MEETS, C_LABEL_SELECTED, C_ORDER_DATE_PLACEHOLDER,
};
use crate::spec::{
    SpecDerivedFields, SpecDerivedRecord, SpecRecord, SpecReportMetadata, SpecSelectionState,
    SpecSelectionStore,
};
use crate::util::format_date_long_uk;

/// Assessment phrase for one state.
pub fn derive_assessment_text(state: &SpecSelectionState) -> &'static str {
    if state.selected {
        C_ASSESSMENT_MEETS
    } else {
        C_ASSESSMENT_FAILS
    }
}

/// Rejection note, suppressed while selected.
pub fn derive_note_text(state: &SpecSelectionState) -> String {
    if state.selected {
        String::new()
    } else {
        state.note.clone()
    }
}

/// Receiving-act note: the default label while selected, the rejection note otherwise.
pub fn derive_selection_text(state: &SpecSelectionState) -> String {
    if state.selected {
        C_LABEL_SELECTED.to_string()
    } else {
        state.note.clone()
    }
}

/// Long-form order date, or the blank placeholder.
pub fn format_order_date(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| C_ORDER_DATE_PLACEHOLDER.to_string(), format_date_long_uk)
}

/// Resolve every derived value of one export.
///
/// Records without a selection entry count as selected.
pub fn derive_fields(
    records: &[SpecRecord],
    selection: &SpecSelectionStore,
    metadata: &SpecReportMetadata,
    today: NaiveDate,
) -> SpecDerivedFields {
    let state_default = SpecSelectionState::seeded();
    let l_states: Vec<&SpecSelectionState> = records
        .iter()
        .map(|record| selection.get(record.id).unwrap_or(&state_default))
        .collect();

    let n_total = l_states.len();
    let n_selected = l_states.iter().filter(|state| state.selected).count();

    SpecDerivedFields {
        n_total,
        n_selected,
        n_rejected: n_total - n_selected,
        records: l_states
            .iter()
            .map(|state| SpecDerivedRecord {
                assessment_text: derive_assessment_text(state).to_string(),
                note_text: derive_note_text(state),
                selection_text: derive_selection_text(state),
            })
            .collect(),
        order_date_text: format_order_date(metadata.order_date),
        today_text: format_date_long_uk(today),
        today,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 4).expect("date")
    }

    fn build_records(n: usize) -> Vec<SpecRecord> {
        (0..n).map(SpecRecord::new).collect()
    }

    #[test]
    fn counts_always_sum_to_total() {
        let records = build_records(5);
        let mut selection = SpecSelectionStore::seeded(5);
        for id in [0, 3, 4] {
            selection = selection.toggle(id).expect("toggle");
        }
        let derived = derive_fields(&records, &selection, &SpecReportMetadata::default(), today());
        assert_eq!(derived.n_total, 5);
        assert_eq!(derived.n_selected, 2);
        assert_eq!(derived.n_rejected, 3);
        assert_eq!(derived.n_selected + derived.n_rejected, derived.n_total);
    }

    #[test]
    fn rejected_record_texts() {
        let records = build_records(2);
        let selection = SpecSelectionStore::seeded(2)
            .toggle(1)
            .and_then(|s| s.set_note(1, "incomplete documents"))
            .expect("edit");
        let derived = derive_fields(&records, &selection, &SpecReportMetadata::default(), today());

        assert_eq!(derived.records[0].assessment_text, C_ASSESSMENT_MEETS);
        assert_eq!(derived.records[0].note_text, "");
        assert_eq!(derived.records[0].selection_text, C_LABEL_SELECTED);
        assert_eq!(derived.records[1].assessment_text, C_ASSESSMENT_FAILS);
        assert_eq!(derived.records[1].note_text, "incomplete documents");
        assert_eq!(derived.records[1].selection_text, "incomplete documents");
    }

    #[test]
    fn note_is_suppressed_while_selected() {
        let selection = SpecSelectionStore::seeded(1)
            .set_note(0, "чернетка")
            .expect("edit");
        let derived = derive_fields(
            &build_records(1),
            &selection,
            &SpecReportMetadata::default(),
            today(),
        );
        assert_eq!(derived.records[0].note_text, "");
        assert_eq!(derived.records[0].selection_text, C_LABEL_SELECTED);
    }

    #[test]
    fn dates_and_fallbacks() {
        let mut metadata = SpecReportMetadata::default();
        let derived = derive_fields(&[], &SpecSelectionStore::default(), &metadata, today());
        assert_eq!(derived.order_date_text, C_ORDER_DATE_PLACEHOLDER);
        assert_eq!(derived.today_text, "04 листопада 2025 р.");
        assert_eq!(derived.n_total, 0);

        metadata.order_date = NaiveDate::from_ymd_opt(2025, 1, 17);
        let derived = derive_fields(&[], &SpecSelectionStore::default(), &metadata, today());
        assert_eq!(derived.order_date_text, "17 січня 2025 р.");
    }

    #[test]
    fn missing_selection_entries_count_as_selected() {
        let derived = derive_fields(
            &build_records(2),
            &SpecSelectionStore::seeded(1),
            &SpecReportMetadata::default(),
            today(),
        );
        assert_eq!(derived.n_selected, 2);
    }
}
