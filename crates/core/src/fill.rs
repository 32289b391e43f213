//! Filling a blank declaration form with computed values.
//!
//! The blank template produced by the pipeline carries everything
//! filling needs: named text fields in the AcroForm, and the TobRefs
//! side table locating the strikethrough annotations by declarant
//! category. Filling sets field values by name and removes the
//! strikethrough of the category that applies to the declarant, so
//! only the non-applicable categories stay struck out.

use std::collections::BTreeMap;

use lopdf::Document;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document;
use crate::error::{FormError, Result};
use crate::money::{Separators, format_money};

/// Declarant category whose strikethrough is removed when filling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Declarant {
    /// Professional intermediary.
    Prof,
    /// Responsible representative.
    Repr,
    /// Institution or person other than an intermediary.
    Inst,
}

impl Declarant {
    pub fn as_str(self) -> &'static str {
        match self {
            Declarant::Prof => "prof",
            Declarant::Repr => "repr",
            Declarant::Inst => "inst",
        }
    }
}

/// Field values to write into a blank form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FillValues {
    /// Field name to value text.
    pub fields: BTreeMap<String, String>,
    /// When set, the strikethrough of this category is removed.
    #[serde(default)]
    pub declarant: Option<Declarant>,
}

/// Fill a blank fillable template and return the resulting document
/// bytes.
///
/// Every entry of `values.fields` must name an existing form field;
/// an unknown name fails with [`FormError::FieldNotFound`] before
/// anything is saved. Appearance streams of written fields are
/// dropped and the form's NeedAppearances flag is set, so the viewer
/// renders the new values with the embedded fill font.
pub fn fill_template(blank: &[u8], values: &FillValues) -> Result<Vec<u8>> {
    let mut doc = Document::load_mem(blank)?;

    let fields: BTreeMap<String, lopdf::ObjectId> =
        document::form_fields(&doc)?.into_iter().collect();
    for (name, value) in &values.fields {
        let id = fields
            .get(name)
            .copied()
            .ok_or_else(|| FormError::FieldNotFound(name.clone()))?;
        document::set_field_value(&mut doc, id, value)?;
    }
    document::set_need_appearances(&mut doc)?;

    if let Some(declarant) = values.declarant {
        let annot_id = document::strikethrough_ref(&doc, declarant.as_str())?;
        document::remove_annotation(&mut doc, annot_id)?;
    }
    debug!(
        fields = values.fields.len(),
        declarant = values.declarant.map(Declarant::as_str),
        "filled template"
    );

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

/// Values of one tax-rate row of a transaction table. Monetary
/// amounts are in minor currency units.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TaxRow {
    pub quantity: u64,
    pub tax_base: f64,
    pub tax_value: f64,
}

/// Values of one transaction table (rates 0.12%, 0.35%, 1.32%).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TableValues {
    pub tax_012: TaxRow,
    pub tax_035: TaxRow,
    pub tax_132: TaxRow,
    pub total_tax_value: f64,
}

/// The complete value set of a declaration, mirroring the official
/// form. Renders into [`FillValues`] through
/// [`DeclarationValues::to_fill_values`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclarationValues {
    pub start_month: u8,
    pub start_year: u16,
    pub end_month: u8,
    pub end_year: u16,
    pub national_registration_number: String,
    pub full_name: String,
    pub address_line_1: String,
    pub address_line_2: String,
    pub address_line_3: String,
    /// Transaction tables by letter ("a" and "b", matching the
    /// tables on the official form); absent tables are left blank.
    pub tables: BTreeMap<String, TableValues>,
    pub total_tax_value: f64,
    pub location: String,
    pub date: String,
    pub signer_name: String,
    #[serde(default)]
    pub signer_capacity: String,
    pub declarant: Declarant,
}

impl DeclarationValues {
    /// Render every value into form-field text using the given
    /// currency symbol and separators for monetary amounts.
    pub fn to_fill_values(&self, currency: &str, seps: &Separators) -> FillValues {
        let mut fields = BTreeMap::new();
        let money = |v: f64| format_money(v, currency, seps);

        fields.insert("start_month".into(), format!("{:02}", self.start_month));
        fields.insert("start_year".into(), self.start_year.to_string());
        fields.insert("end_month".into(), format!("{:02}", self.end_month));
        fields.insert("end_year".into(), self.end_year.to_string());
        fields.insert(
            "national_registration_number".into(),
            self.national_registration_number.clone(),
        );
        fields.insert("full_name".into(), self.full_name.clone());
        fields.insert("address_line_1".into(), self.address_line_1.clone());
        fields.insert("address_line_2".into(), self.address_line_2.clone());
        fields.insert("address_line_3".into(), self.address_line_3.clone());

        for (table, values) in &self.tables {
            let rows = [
                ("012", &values.tax_012),
                ("035", &values.tax_035),
                ("132", &values.tax_132),
            ];
            for (rate, row) in rows {
                fields.insert(
                    format!("table_{table}_tax_{rate}_quantity"),
                    row.quantity.to_string(),
                );
                fields.insert(format!("table_{table}_tax_{rate}_tax_base"), money(row.tax_base));
                fields.insert(
                    format!("table_{table}_tax_{rate}_tax_value"),
                    money(row.tax_value),
                );
            }
            fields.insert(
                format!("table_{table}_total_tax_value"),
                money(values.total_tax_value),
            );
        }

        fields.insert("total_tax_value".into(), money(self.total_tax_value));
        fields.insert("location".into(), self.location.clone());
        fields.insert("date".into(), self.date.clone());
        let mut signer = self.signer_name.clone();
        if !self.signer_capacity.is_empty() {
            signer.push_str(&format!("  , {}", self.signer_capacity));
        }
        fields.insert("signer".into(), signer);

        FillValues {
            fields,
            declarant: Some(self.declarant),
        }
    }
}
