// src/dataverse/lead_mapper.rs
//
// Bidirectional transform between the normalized `Lead` record and the
// Dataverse row shape. `to_lead` is total: every UI field has a deterministic
// default when the remote attribute is absent. `to_remote` is a best-effort
// partial map: UI-only fields are dropped, lookups are written as
// `@odata.bind` references by id, optionsets as their numeric codes.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};

use crate::models::lead::{Lead, LeadPatch, LeadSource, LeadStatus};

// Entity sets.
pub const LEAD_ENTITY_SET: &str = "crdfd_potentialcustomers";
pub const CUSTOMER_ENTITY_SET: &str = "crdfd_customers";
pub const DISTRICT_ENTITY_SET: &str = "crdfd_districts";
pub const PROVINCE_ENTITY_SET: &str = "crdfd_provinces";
pub const EMPLOYEE_ENTITY_SET: &str = "crdfd_employees";

pub const LEAD_ID_ATTR: &str = "crdfd_potentialcustomerid";

/// Annotation suffix carrying display values when
/// `Prefer: odata.include-annotations="*"` is requested.
const FORMATTED: &str = "@OData.Community.Display.V1.FormattedValue";

/// The fixed projection requested on every lead read. Payloads stay bounded;
/// a wildcard is never sent.
pub const LEAD_COLUMNS: &[&str] = &[
    LEAD_ID_ATTR,
    "crdfd_name",
    "crdfd_phonenumber",
    "crdfd_email",
    "crdfd_address",
    "crdfd_taxcode",
    "crdfd_source",
    "crdfd_campaign",
    "crdfd_leadstatus",
    "_crdfd_district_value",
    "_crdfd_province_value",
    "crdfd_birthdate",
    "crdfd_detailedindustry",
    "crdfd_tradename",
    "crdfd_supervisor",
    "crdfd_salesstaff",
    "crdfd_debtstaff",
    "crdfd_initialpotential",
    "crdfd_generalinfo",
    "crdfd_repdescription",
    "crdfd_keyindustry",
    "crdfd_subindustry",
    "crdfd_storetype",
    "createdon",
];

// --- remote → Lead ---

pub fn to_lead(row: &Map<String, Value>) -> Lead {
    let name = text(row, "crdfd_name").unwrap_or_default();

    let status_code = int(row, "crdfd_leadstatus");
    let status = match status_code {
        Some(code) => LeadStatus::from_code(code),
        // Some legacy rows carry only the formatted label.
        None => formatted(row, "crdfd_leadstatus")
            .map(|l| LeadStatus::from_label(&l))
            .unwrap_or(LeadStatus::Unknown),
    };

    let source = int(row, "crdfd_source")
        .and_then(LeadSource::from_code)
        .map(|s| s.label().to_string())
        .unwrap_or_default();
    let campaign = text(row, "crdfd_campaign").unwrap_or_default();

    Lead {
        id: text(row, LEAD_ID_ATTR).unwrap_or_default(),
        initials: initials_of(&name),
        avatar_color_class: avatar_color_of(&name),
        sub_info: sub_info_of(&source, &campaign),
        name,
        phone: text(row, "crdfd_phonenumber").unwrap_or_default(),
        email: text(row, "crdfd_email").unwrap_or_default(),
        address: text(row, "crdfd_address").unwrap_or_default(),
        tax_code: text(row, "crdfd_taxcode").unwrap_or_default(),
        source,
        campaign,
        status,
        status_code,
        district: formatted(row, "_crdfd_district_value").unwrap_or_else(|| "N/A".to_string()),
        district_id: text(row, "_crdfd_district_value"),
        city: formatted(row, "_crdfd_province_value").unwrap_or_else(|| "N/A".to_string()),
        city_id: text(row, "_crdfd_province_value"),
        birth_date: text(row, "crdfd_birthdate")
            .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        detailed_industry: text(row, "crdfd_detailedindustry"),
        detailed_industry_text: formatted(row, "crdfd_detailedindustry"),
        trade_name: text(row, "crdfd_tradename"),
        supervisor: text(row, "crdfd_supervisor"),
        sales_staff: text(row, "crdfd_salesstaff"),
        debt_staff: text(row, "crdfd_debtstaff"),
        initial_potential: text(row, "crdfd_initialpotential"),
        initial_general_info: text(row, "crdfd_generalinfo"),
        rep_description: text(row, "crdfd_repdescription"),
        key_industry: text(row, "crdfd_keyindustry"),
        sub_industry: text(row, "crdfd_subindustry"),
        store_type: text(row, "crdfd_storetype"),
        created_on: text(row, "createdon")
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc)),
    }
}

// --- Lead → remote ---

/// Map a partial edit to the lead entity's wire shape. Location edits are
/// emitted only as lookup binds and only when the id is known; names alone
/// are never written. `initials`, `avatarColorClass`, `subInfo` and the
/// formatted industry text have no remote counterpart and are dropped.
pub fn to_remote(patch: &LeadPatch) -> Map<String, Value> {
    let mut row = Map::new();

    put_text(&mut row, "crdfd_name", &patch.name);
    put_text(&mut row, "crdfd_phonenumber", &patch.phone);
    put_text(&mut row, "crdfd_email", &patch.email);
    put_text(&mut row, "crdfd_address", &patch.address);
    put_text(&mut row, "crdfd_taxcode", &patch.tax_code);
    put_text(&mut row, "crdfd_campaign", &patch.campaign);

    if let Some(label) = &patch.source {
        if let Some(source) = LeadSource::from_label(label) {
            row.insert("crdfd_source".to_string(), Value::from(source.code()));
        }
    }
    if let Some(code) = patch.status.and_then(|s| s.code()) {
        row.insert("crdfd_leadstatus".to_string(), Value::from(code));
    }

    if let Some(id) = &patch.district_id {
        row.insert(
            "crdfd_District@odata.bind".to_string(),
            Value::from(format!("/{DISTRICT_ENTITY_SET}({id})")),
        );
    }
    if let Some(id) = &patch.city_id {
        row.insert(
            "crdfd_Province@odata.bind".to_string(),
            Value::from(format!("/{PROVINCE_ENTITY_SET}({id})")),
        );
    }

    if let Some(date) = patch.birth_date {
        row.insert(
            "crdfd_birthdate".to_string(),
            Value::from(date.format("%Y-%m-%d").to_string()),
        );
    }

    put_text(&mut row, "crdfd_detailedindustry", &patch.detailed_industry);
    put_text(&mut row, "crdfd_tradename", &patch.trade_name);
    put_text(&mut row, "crdfd_supervisor", &patch.supervisor);
    put_text(&mut row, "crdfd_salesstaff", &patch.sales_staff);
    put_text(&mut row, "crdfd_debtstaff", &patch.debt_staff);
    put_text(&mut row, "crdfd_initialpotential", &patch.initial_potential);
    put_text(&mut row, "crdfd_generalinfo", &patch.initial_general_info);
    put_text(&mut row, "crdfd_repdescription", &patch.rep_description);
    put_text(&mut row, "crdfd_keyindustry", &patch.key_industry);
    put_text(&mut row, "crdfd_subindustry", &patch.sub_industry);
    put_text(&mut row, "crdfd_storetype", &patch.store_type);

    row
}

/// The full-customer entity shares the lead's attribute names under the same
/// publisher prefix, so the Sale save path reuses the lead mapping minus the
/// lead-only status optionset.
pub fn to_customer_remote(patch: &LeadPatch) -> Map<String, Value> {
    let mut row = to_remote(patch);
    row.remove("crdfd_leadstatus");
    row
}

// --- helpers ---

fn text(row: &Map<String, Value>, attr: &str) -> Option<String> {
    match row.get(attr)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn formatted(row: &Map<String, Value>, attr: &str) -> Option<String> {
    text(row, &format!("{attr}{FORMATTED}"))
}

fn int(row: &Map<String, Value>, attr: &str) -> Option<i64> {
    row.get(attr).and_then(Value::as_i64)
}

fn put_text(row: &mut Map<String, Value>, attr: &str, value: &Option<String>) {
    if let Some(v) = value {
        row.insert(attr.to_string(), Value::from(v.clone()));
    }
}

fn initials_of(name: &str) -> String {
    let mut words = name.split_whitespace();
    let first = words.next().and_then(|w| w.chars().next());
    let last = words.last().and_then(|w| w.chars().next());
    match (first, last) {
        (Some(f), Some(l)) => format!("{}{}", f, l).to_uppercase(),
        (Some(f), None) => f.to_uppercase().to_string(),
        _ => "?".to_string(),
    }
}

const AVATAR_COLORS: &[&str] = &[
    "avatar-blue",
    "avatar-green",
    "avatar-orange",
    "avatar-purple",
    "avatar-red",
    "avatar-teal",
];

/// Stable per-name color from a fixed palette.
fn avatar_color_of(name: &str) -> String {
    let sum: usize = name.bytes().map(|b| b as usize).sum();
    AVATAR_COLORS[sum % AVATAR_COLORS.len()].to_string()
}

fn sub_info_of(source: &str, campaign: &str) -> String {
    match (source.is_empty(), campaign.is_empty()) {
        (false, false) => format!("{source} · {campaign}"),
        (false, true) => source.to_string(),
        (true, false) => campaign.to_string(),
        (true, true) => String::new(),
    }
}
