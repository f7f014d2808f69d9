//! Fixed act shapes expressed as row-block definitions.

use chrono::Datelike;

use crate::conf::{
    C_ACQUAINTANCE_LABEL, C_APPROVAL_DATE_TEMPLATE, C_APPROVAL_LABEL,
    C_DESCRIPTION_COMMISSION_TEMPLATE, C_DESCRIPTION_RECEIVING_TEMPLATE, C_MPS_DEFAULT,
    C_SHEET_NAME, C_SIGNATURE_CAPTION, C_SIGNATURE_LINE, C_SIGNATURE_ON_FILE,
    C_SUMMARY_COMMISSION_COUNT_TEMPLATE, C_SUMMARY_COMMISSION_REJECTED,
    C_SUMMARY_COMMISSION_SELECTED, C_SUMMARY_COMMISSION_TOTAL,
    C_SUMMARY_RECEIVING_SELECTED_TEMPLATE, C_SUMMARY_RECEIVING_TOTAL_TEMPLATE, C_TITLE_ACT,
    C_TITLE_ANNEX, C_TITLE_COPY, TUP_COMMISSION_SIGNATORIES, derive_align_format,
    derive_border_format, derive_default_column_format, derive_default_page_setup,
    derive_shape_columns, derive_wrapped_center_format,
};
use crate::layout::{
    EnumCellBinding, EnumRowBlock, EnumRowHeightRule, SpecRecordRowSpec, SpecRowSpec,
    SpecShapeDefinition,
};
use crate::spec::{
    EnumActShape, EnumColumnKey, EnumRecordField, SpecCellFormat, SpecDerivedFields,
    SpecReportMetadata, SpecSignatory,
};
use crate::util::render_text_template;

use EnumColumnKey as K;

/// Column anchors of the preamble, which differ between the two act layouts.
struct SpecPreambleAnchors {
    col_title: EnumColumnKey,
    col_approver_name: EnumColumnKey,
    merge_position: (EnumColumnKey, EnumColumnKey),
    merge_date: (EnumColumnKey, EnumColumnKey),
    col_last: EnumColumnKey,
    title: &'static str,
    description_template: &'static str,
}

/// Build the definition of `shape` for one export.
pub fn derive_shape_definition(
    shape: EnumActShape,
    derived: &SpecDerivedFields,
    metadata: &SpecReportMetadata,
) -> SpecShapeDefinition {
    let anchors = match shape {
        EnumActShape::Receiving => SpecPreambleAnchors {
            col_title: K::Signature,
            col_approver_name: K::Note,
            merge_position: (K::MobilizationUnit, K::Signature),
            merge_date: (K::MobilizationUnit, K::Signature),
            col_last: K::Signature,
            title: C_TITLE_ANNEX,
            description_template: C_DESCRIPTION_RECEIVING_TEMPLATE,
        },
        EnumActShape::Commission | EnumActShape::CommissionCopy => SpecPreambleAnchors {
            col_title: K::Assessment,
            col_approver_name: K::Assessment,
            merge_position: (K::MobilizationUnit, K::Note),
            merge_date: (K::MobilizationUnit, K::Assessment),
            col_last: K::Note,
            title: if shape.if_copy() {
                C_TITLE_COPY
            } else {
                C_TITLE_ANNEX
            },
            description_template: C_DESCRIPTION_COMMISSION_TEMPLATE,
        },
    };

    let mut l_blocks = plan_preamble_blocks(&anchors, derived, metadata);
    l_blocks.push(EnumRowBlock::Header {
        format: derive_wrapped_center_format(),
        fmt_cell: derive_border_format(),
    });
    match shape {
        EnumActShape::Receiving => {
            l_blocks.push(plan_receiving_record_block());
            l_blocks.extend(plan_receiving_closing_blocks(derived, metadata));
        }
        EnumActShape::Commission | EnumActShape::CommissionCopy => {
            l_blocks.push(plan_commission_record_block());
            l_blocks.extend(plan_commission_closing_blocks(
                derived,
                metadata,
                shape.if_copy(),
            ));
        }
    }

    SpecShapeDefinition {
        shape,
        sheet_name: C_SHEET_NAME.to_string(),
        columns: derive_shape_columns(shape),
        fmt_column: derive_default_column_format(),
        page_setup: derive_default_page_setup(shape),
        blocks: l_blocks,
    }
}

/// Rows 1-9: title, approval block, `АКТ`, description and a spacer.
fn plan_preamble_blocks(
    anchors: &SpecPreambleAnchors,
    derived: &SpecDerivedFields,
    metadata: &SpecReportMetadata,
) -> Vec<EnumRowBlock> {
    let c_year = derived.today.year().to_string();
    let c_description = render_text_template(
        anchors.description_template,
        &[
            ("unit", metadata.destination_unit.as_str()),
            ("order_date", derived.order_date_text.as_str()),
            ("order_number", metadata.order_number.as_str()),
        ],
    );
    let approver = &metadata.approver;

    [
        SpecRowSpec::blank().with_text_fmt(
            anchors.col_title,
            anchors.title,
            derive_align_format("right"),
        ),
        SpecRowSpec::blank().with_text(K::MobilizationUnit, C_APPROVAL_LABEL),
        SpecRowSpec::blank()
            .with_text(K::MobilizationUnit, approver.position.as_str())
            .with_merge(anchors.merge_position.0, anchors.merge_position.1),
        SpecRowSpec::blank()
            .with_text(K::MobilizationUnit, approver.rank.as_str())
            .with_text_fmt(
                anchors.col_approver_name,
                approver.name.as_str(),
                derive_align_format("right"),
            ),
        SpecRowSpec::blank()
            .with_text(
                K::MobilizationUnit,
                render_text_template(C_APPROVAL_DATE_TEMPLATE, &[("year", c_year.as_str())]),
            )
            .with_merge(anchors.merge_date.0, anchors.merge_date.1),
        SpecRowSpec::blank(),
        SpecRowSpec::blank()
            .with_text_fmt(
                K::Index,
                C_TITLE_ACT,
                derive_align_format("center").with_(SpecCellFormat {
                    bold: Some(true),
                    ..Default::default()
                }),
            )
            .with_merge(K::Index, anchors.col_last),
        SpecRowSpec::blank()
            .with_text(K::Index, c_description)
            .with_format(derive_wrapped_center_format())
            .with_merge(K::Index, anchors.col_last)
            .with_height(EnumRowHeightRule::WrappedText(K::Index)),
        SpecRowSpec::blank(),
    ]
    .into_iter()
    .map(EnumRowBlock::Row)
    .collect()
}

fn derive_data_row_format() -> SpecCellFormat {
    SpecCellFormat {
        valign: Some("vcenter".to_string()),
        text_wrap: Some(true),
        ..Default::default()
    }
}

fn derive_field_bindings() -> Vec<(EnumColumnKey, EnumCellBinding)> {
    EnumRecordField::ALL
        .into_iter()
        .map(|field| (EnumColumnKey::from(field), EnumCellBinding::Field(field)))
        .collect()
}

////////////////////////////////////////////////////////////////////////////////
// #region ReceivingAct

fn plan_receiving_record_block() -> EnumRowBlock {
    let mut l_bindings = derive_field_bindings();
    l_bindings.push((K::Note, EnumCellBinding::SelectionNote));
    l_bindings.push((K::Signature, EnumCellBinding::Blank));

    EnumRowBlock::Records(SpecRecordRowSpec {
        bindings: l_bindings,
        cols_center: vec![K::Index, K::Birthday, K::Age, K::Note],
        format: derive_data_row_format(),
        fmt_cell: derive_border_format(),
    })
}

fn plan_receiving_closing_blocks(
    derived: &SpecDerivedFields,
    metadata: &SpecReportMetadata,
) -> Vec<EnumRowBlock> {
    let c_total = derived.n_total.to_string();
    let c_selected = derived.n_selected.to_string();

    let mut l_rows = vec![
        SpecRowSpec::blank(),
        SpecRowSpec::blank(),
        SpecRowSpec::blank()
            .with_text(
                K::Index,
                render_text_template(
                    C_SUMMARY_RECEIVING_TOTAL_TEMPLATE,
                    &[("count", c_total.as_str())],
                ),
            )
            .with_merge(K::Index, K::Signature),
        SpecRowSpec::blank()
            .with_text(
                K::Index,
                render_text_template(
                    C_SUMMARY_RECEIVING_SELECTED_TEMPLATE,
                    &[("count", c_selected.as_str())],
                ),
            )
            .with_merge(K::Index, K::Signature),
        SpecRowSpec::blank(),
    ];

    let l_signatories: [&SpecSignatory; 2] =
        [&metadata.responsible, &metadata.distribution_responsible];
    for (n_idx, signatory) in l_signatories.into_iter().enumerate() {
        if n_idx > 0 {
            l_rows.push(SpecRowSpec::blank());
        }
        l_rows.push(
            SpecRowSpec::blank()
                .with_text(K::Rank, signatory.position.as_str())
                .with_merge(K::Rank, K::Note),
        );
        l_rows.push(
            SpecRowSpec::blank()
                .with_text(K::Rank, signatory.rank.as_str())
                .with_text(K::Note, signatory.name.as_str()),
        );
        l_rows.push(
            SpecRowSpec::blank()
                .with_text(K::Rank, derived.today_text.as_str())
                .with_merge(K::Rank, K::Signature),
        );
    }

    l_rows.into_iter().map(EnumRowBlock::Row).collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CommissionAct

fn plan_commission_record_block() -> EnumRowBlock {
    let mut l_bindings = derive_field_bindings();
    l_bindings.push((K::Mps, EnumCellBinding::Text(C_MPS_DEFAULT.to_string())));
    l_bindings.push((K::Assessment, EnumCellBinding::Assessment));
    l_bindings.push((K::Note, EnumCellBinding::RejectionNote));

    EnumRowBlock::Records(SpecRecordRowSpec {
        bindings: l_bindings,
        cols_center: vec![K::Index, K::Birthday, K::Age, K::Mps, K::Assessment, K::Note],
        format: derive_data_row_format(),
        fmt_cell: derive_border_format(),
    })
}

fn plan_signature_caption_row() -> SpecRowSpec {
    SpecRowSpec::blank()
        .with_text_fmt(K::Birthday, C_SIGNATURE_CAPTION, derive_align_format("center"))
        .with_merge(K::Birthday, K::Age)
}

fn plan_commission_closing_blocks(
    derived: &SpecDerivedFields,
    metadata: &SpecReportMetadata,
    if_copy: bool,
) -> Vec<EnumRowBlock> {
    let fmt_count = derive_align_format("center").with_(SpecCellFormat {
        valign: Some("vcenter".to_string()),
        ..Default::default()
    });
    let l_summary = [
        (C_SUMMARY_COMMISSION_TOTAL, derived.n_total),
        (C_SUMMARY_COMMISSION_SELECTED, derived.n_selected),
        (C_SUMMARY_COMMISSION_REJECTED, derived.n_rejected),
    ];

    let mut l_rows = vec![SpecRowSpec::blank()];
    for (n_idx, (label, count)) in l_summary.into_iter().enumerate() {
        let c_count = count.to_string();
        let mut row = SpecRowSpec::blank()
            .with_text(K::Index, label)
            .with_text_fmt(
                K::Name,
                render_text_template(
                    C_SUMMARY_COMMISSION_COUNT_TEMPLATE,
                    &[("count", c_count.as_str())],
                ),
                fmt_count.clone(),
            )
            .with_merge(K::Index, K::Rank)
            .with_merge(K::Name, K::Birthday);
        if n_idx + 1 == l_summary.len() {
            row = row.with_page_break();
        }
        l_rows.push(row);
    }
    l_rows.push(SpecRowSpec::blank());

    let c_signature = if if_copy {
        C_SIGNATURE_ON_FILE
    } else {
        C_SIGNATURE_LINE
    };
    for (role, name) in TUP_COMMISSION_SIGNATORIES {
        l_rows.push(
            SpecRowSpec::blank()
                .with_text(K::Rank, role)
                .with_text(K::Name, name)
                .with_text_fmt(K::Birthday, c_signature, derive_align_format("center"))
                .with_merge(K::Birthday, K::Age),
        );
        l_rows.push(plan_signature_caption_row());
    }

    l_rows.push(SpecRowSpec::blank());
    l_rows.push(
        SpecRowSpec::blank()
            .with_text(K::Rank, C_ACQUAINTANCE_LABEL)
            .with_text_fmt(K::Birthday, C_SIGNATURE_LINE, derive_align_format("center"))
            .with_text(
                K::MedicalCommission,
                metadata.distribution_responsible.name.as_str(),
            )
            .with_merge(K::Rank, K::Name)
            .with_merge(K::Birthday, K::Age)
            .with_merge(K::MedicalCommission, K::Mps),
    );
    l_rows.push(plan_signature_caption_row());

    l_rows.into_iter().map(EnumRowBlock::Row).collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::{
        C_ASSESSMENT_FAILS, C_ASSESSMENT_MEETS, C_LABEL_SELECTED, C_ORDER_DATE_PLACEHOLDER,
    };
    use crate::derive::derive_fields;
    use crate::import::import_records;
    use crate::layout::layout;
    use crate::spec::{
        EnumCellValue, SpecCellGrid, SpecDocumentModel, SpecMergeRegion, SpecRecord,
        SpecSelectionStore,
    };
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 5).expect("date")
    }

    fn build_records(n: usize) -> Vec<SpecRecord> {
        (0..n)
            .map(|id| {
                SpecRecord::new(id)
                    .with_(EnumRecordField::Index, (id + 1) as f64)
                    .with_(EnumRecordField::Rank, "солдат")
                    .with_(EnumRecordField::Name, format!("Військовослужбовець {id}"))
                    .with_(EnumRecordField::Age, 30.0)
            })
            .collect()
    }

    fn build_metadata() -> SpecReportMetadata {
        SpecReportMetadata {
            destination_unit: "А1234".to_string(),
            order_number: "№ 17/45".to_string(),
            distribution_responsible: SpecSignatory {
                position: "Представник військової частини А1234".to_string(),
                rank: "капітан".to_string(),
                name: "Петро ШЕВЧУК".to_string(),
            },
            ..Default::default()
        }
    }

    fn run_layout(
        shape: EnumActShape,
        records: &[SpecRecord],
        selection: &SpecSelectionStore,
        metadata: &SpecReportMetadata,
    ) -> SpecDocumentModel {
        let derived = derive_fields(records, selection, metadata, today());
        layout(shape, records, selection, &derived, metadata).expect("layout")
    }

    #[test]
    fn commission_act_end_to_end() {
        let records = build_records(3);
        let selection = SpecSelectionStore::seeded(3)
            .toggle(1)
            .and_then(|s| s.set_note(1, "incomplete documents"))
            .expect("edit");
        let doc = run_layout(EnumActShape::Commission, &records, &selection, &build_metadata());

        assert_eq!(doc.n_rows(), 10 + 3 + 20);
        assert_eq!(doc.n_cols(), 10);

        let row_rejected = doc.row(12).expect("data row");
        assert_eq!(row_rejected.text(K::Assessment), C_ASSESSMENT_FAILS);
        assert_eq!(row_rejected.text(K::Note), "incomplete documents");
        assert_eq!(row_rejected.text(K::Mps), C_MPS_DEFAULT);
        let row_selected = doc.row(11).expect("data row");
        assert_eq!(row_selected.text(K::Assessment), C_ASSESSMENT_MEETS);
        assert_eq!(row_selected.text(K::Note), "");
        assert_eq!(row_selected.text(K::Index), "1");

        for (n_row, label, n_count) in [
            (15, C_SUMMARY_COMMISSION_TOTAL, 3),
            (16, C_SUMMARY_COMMISSION_SELECTED, 2),
            (17, C_SUMMARY_COMMISSION_REJECTED, 1),
        ] {
            let row = doc.row(n_row).expect("summary");
            assert_eq!(row.text(K::Index), label);
            assert_eq!(
                row.text(K::Name),
                format!("{n_count} військовослужбовців (службових документів на них)")
            );
        }
        assert_eq!(doc.page_breaks(), vec![17]);

        assert!(doc.merges.contains(&SpecMergeRegion::horizontal(3, 8, 10)));
        assert!(doc.merges.contains(&SpecMergeRegion::horizontal(5, 8, 9)));
        assert!(doc.merges.contains(&SpecMergeRegion::horizontal(8, 1, 10)));
        assert_eq!(doc.row(19).expect("signatory").text(K::Birthday), C_SIGNATURE_LINE);
        assert_eq!(doc.row(20).expect("caption").text(K::Birthday), C_SIGNATURE_CAPTION);
        let row_acquaintance = doc.row(32).expect("acquaintance");
        assert_eq!(row_acquaintance.text(K::Rank), C_ACQUAINTANCE_LABEL);
        assert_eq!(row_acquaintance.text(K::MedicalCommission), "Петро ШЕВЧУК");
    }

    #[test]
    fn commission_act_from_imported_roster() {
        let mut grid = SpecCellGrid::new();
        for (col_idx, label) in ["№ з/п", "В/звання", "Прізвище, ім'я та по-батькові", "Вік"]
            .into_iter()
            .enumerate()
        {
            grid.insert(1, col_idx as u32 + 1, label.into());
        }
        for (n_row, c_name) in [(2, "Петренко Іван"), (3, "Коваль Олег"), (4, "Бондар Андрій")] {
            grid.insert(n_row, 1, EnumCellValue::Number(f64::from(n_row - 1)));
            grid.insert(n_row, 2, "солдат".into());
            grid.insert(n_row, 3, c_name.into());
            grid.insert(n_row, 4, EnumCellValue::Number(25.0));
        }

        let imported = import_records(&grid).expect("import");
        assert_eq!(imported.records.len(), 3);
        let selection = imported
            .selection
            .toggle(1)
            .and_then(|s| s.set_note(1, "incomplete documents"))
            .expect("edit");
        let doc = run_layout(
            EnumActShape::Commission,
            &imported.records,
            &selection,
            &build_metadata(),
        );

        assert_eq!(doc.n_rows(), 10 + 3 + 20);
        for (n_row, c_name, c_assessment, c_note) in [
            (11, "Петренко Іван", C_ASSESSMENT_MEETS, ""),
            (12, "Коваль Олег", C_ASSESSMENT_FAILS, "incomplete documents"),
            (13, "Бондар Андрій", C_ASSESSMENT_MEETS, ""),
        ] {
            let row = doc.row(n_row).expect("data row");
            assert_eq!(row.text(K::Index), (n_row - 10).to_string());
            assert_eq!(row.text(K::Rank), "солдат");
            assert_eq!(row.text(K::Name), c_name);
            assert_eq!(row.text(K::Age), "25");
            assert_eq!(row.text(K::Mps), C_MPS_DEFAULT);
            assert_eq!(row.text(K::Assessment), c_assessment);
            assert_eq!(row.text(K::Note), c_note);
        }

        for (n_row, n_count) in [(15, 3), (16, 2), (17, 1)] {
            assert_eq!(
                doc.row(n_row).expect("summary").text(K::Name),
                format!("{n_count} військовослужбовців (службових документів на них)")
            );
        }
    }

    #[test]
    fn receiving_act_rows_and_texts() {
        let records = build_records(3);
        let selection = SpecSelectionStore::seeded(3).toggle(2).expect("toggle");
        let metadata = build_metadata();
        let doc = run_layout(EnumActShape::Receiving, &records, &selection, &metadata);

        assert_eq!(doc.n_rows(), 10 + 3 + 12);
        assert_eq!(doc.n_cols(), 9);
        assert!(doc.page_breaks().is_empty());
        assert_eq!(doc.row(1).expect("title").text(K::Signature), C_TITLE_ANNEX);
        assert_eq!(
            doc.row(5).expect("approval").text(K::MobilizationUnit),
            "____._______________ 2025 р."
        );
        assert_eq!(doc.row(4).expect("approval").text(K::Note), metadata.approver.name);

        let c_description = doc.row(8).expect("description").text(K::Index);
        assert!(c_description.contains("А1234,\n"));
        assert!(c_description.ends_with(&format!("{C_ORDER_DATE_PLACEHOLDER} № 17/45")));
        assert_eq!(doc.row(8).expect("description").height, Some(32.0));

        assert_eq!(doc.row(11).expect("data").text(K::Note), C_LABEL_SELECTED);
        assert_eq!(doc.row(13).expect("data").text(K::Note), "");
        assert!(doc.row(13).expect("data").cell(K::Signature).is_some());

        assert!(doc.row(16).expect("total").text(K::Index).contains(" 3 "));
        assert!(doc.row(17).expect("selected").text(K::Index).contains(" 2 "));
        assert_eq!(
            doc.row(23).expect("position").text(K::Rank),
            metadata.distribution_responsible.position
        );
        assert_eq!(doc.row(24).expect("name").text(K::Note), "Петро ШЕВЧУК");
        assert_eq!(doc.row(25).expect("date").text(K::Rank), "05 березня 2025 р.");
    }

    #[test]
    fn copy_differs_only_in_title_and_signatures() {
        let records = build_records(2);
        let selection = SpecSelectionStore::seeded(2);
        let metadata = build_metadata();
        let doc = run_layout(EnumActShape::Commission, &records, &selection, &metadata);
        let doc_copy = run_layout(EnumActShape::CommissionCopy, &records, &selection, &metadata);

        assert_eq!(doc_copy.row(1).expect("title").text(K::Assessment), C_TITLE_COPY);
        assert_eq!(doc.row(1).expect("title").text(K::Assessment), C_TITLE_ANNEX);
        assert_eq!(doc.merges, doc_copy.merges);
        assert_eq!(doc.n_rows(), doc_copy.n_rows());

        let n_diff = (1..=doc.n_rows() as u32)
            .filter(|n_row| doc.row(*n_row) != doc_copy.row(*n_row))
            .count();
        assert_eq!(n_diff, 1 + TUP_COMMISSION_SIGNATORIES.len());
        assert_eq!(doc_copy.row(18).expect("signatory").text(K::Birthday), C_SIGNATURE_ON_FILE);
    }

    #[test]
    fn layout_is_idempotent_and_merges_are_disjoint() {
        let records = build_records(4);
        let selection = SpecSelectionStore::seeded(4).toggle(0).expect("toggle");
        let metadata = build_metadata();
        for shape in EnumActShape::ALL {
            let doc = run_layout(shape, &records, &selection, &metadata);
            assert_eq!(doc, run_layout(shape, &records, &selection, &metadata));

            for (n_idx, merge) in doc.merges.iter().enumerate() {
                assert!(merge.is_valid());
                assert!(merge.row_end as usize <= doc.n_rows());
                assert!(merge.col_end as usize <= doc.n_cols());
                assert!(doc.merges[..n_idx].iter().all(|other| !other.overlaps(merge)));
            }
        }
    }

    #[test]
    fn empty_roster_still_renders_every_shape() {
        let metadata = SpecReportMetadata::default();
        for (shape, n_closing) in [
            (EnumActShape::Receiving, 12),
            (EnumActShape::Commission, 20),
            (EnumActShape::CommissionCopy, 20),
        ] {
            let doc = run_layout(shape, &[], &SpecSelectionStore::default(), &metadata);
            assert_eq!(doc.n_rows(), 10 + n_closing);
        }
    }
}
