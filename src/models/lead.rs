// src/models/lead.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// --- STATUS ---

/// Lead status optionset. The remote store keeps an integer code; the UI and
/// the client-side filters work with the Vietnamese labels.
///
/// Two spellings of the pending status circulate in old data ("Đợi xác nhận"
/// and "Chờ xác nhận"); both parse to `Pending`, which always formats back to
/// the canonical "Đợi xác nhận".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeadStatus {
    Pending,
    MarketingConfirmed,
    SaleContacted,
    NotCooperating,
    Unknown,
}

pub const STATUS_PENDING: &str = "Đợi xác nhận";
pub const STATUS_PENDING_LEGACY: &str = "Chờ xác nhận";
pub const STATUS_MARKETING_CONFIRMED: &str = "Marketing đã xác nhận";
pub const STATUS_SALE_CONTACTED: &str = "Sale đã liên hệ";
pub const STATUS_NOT_COOPERATING: &str = "Khách hàng không hợp tác";

impl LeadStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            191_920_000 => Self::Pending,
            191_920_001 => Self::MarketingConfirmed,
            191_920_002 => Self::SaleContacted,
            191_920_003 => Self::NotCooperating,
            _ => Self::Unknown,
        }
    }

    /// `Unknown` has no wire representation and is never written back.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Pending => Some(191_920_000),
            Self::MarketingConfirmed => Some(191_920_001),
            Self::SaleContacted => Some(191_920_002),
            Self::NotCooperating => Some(191_920_003),
            Self::Unknown => None,
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            STATUS_PENDING | STATUS_PENDING_LEGACY => Self::Pending,
            STATUS_MARKETING_CONFIRMED => Self::MarketingConfirmed,
            STATUS_SALE_CONTACTED => Self::SaleContacted,
            STATUS_NOT_COOPERATING => Self::NotCooperating,
            _ => Self::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => STATUS_PENDING,
            Self::MarketingConfirmed => STATUS_MARKETING_CONFIRMED,
            Self::SaleContacted => STATUS_SALE_CONTACTED,
            Self::NotCooperating => STATUS_NOT_COOPERATING,
            Self::Unknown => "Unknown",
        }
    }

    /// Both pending spellings count as one class everywhere a status is
    /// compared (filters, editability).
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl Default for LeadStatus {
    fn default() -> Self {
        Self::Unknown
    }
}

// --- SOURCE ---

/// Lead source optionset, codes 0–6 on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeadSource {
    Facebook,
    Zalo,
    Website,
    Hotline,
    Referral,
    Event,
    Other,
}

impl LeadSource {
    pub const ALL: [LeadSource; 7] = [
        Self::Facebook,
        Self::Zalo,
        Self::Website,
        Self::Hotline,
        Self::Referral,
        Self::Event,
        Self::Other,
    ];

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Facebook),
            1 => Some(Self::Zalo),
            2 => Some(Self::Website),
            3 => Some(Self::Hotline),
            4 => Some(Self::Referral),
            5 => Some(Self::Event),
            6 => Some(Self::Other),
            _ => None,
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::Facebook => 0,
            Self::Zalo => 1,
            Self::Website => 2,
            Self::Hotline => 3,
            Self::Referral => 4,
            Self::Event => 5,
            Self::Other => 6,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Facebook => "Facebook",
            Self::Zalo => "Zalo",
            Self::Website => "Website",
            Self::Hotline => "Hotline",
            Self::Referral => "Giới thiệu",
            Self::Event => "Sự kiện",
            Self::Other => "Khác",
        }
    }

    /// Label parsing for import files. "FB" is the one accepted alias and
    /// canonicalizes to "Facebook".
    pub fn from_label(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        if trimmed.eq_ignore_ascii_case("FB") {
            return Some(Self::Facebook);
        }
        Self::ALL.into_iter().find(|s| s.label() == trimmed)
    }
}

// --- DEPARTMENT ---

/// Operating context picked once per session; gates which leads and which
/// form fields a user sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Department {
    Sale,
    Marketing,
    All,
}

// --- RECORD REFERENCE ---

/// Explicit create-vs-update decision for the Sale save path. The caller
/// states whether the full customer record already exists; the repository
/// never infers it from the shape of an identifier string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordRef {
    New,
    Existing(String),
}

// --- LEAD ---

/// Normalized record for one prospective customer, as the UI consumes it.
/// Produced only by the field mapper; `district`/`city` are "N/A" rather than
/// empty when the remote record has no value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,

    pub name: String,
    pub initials: String,
    pub avatar_color_class: String,
    pub sub_info: String,

    pub phone: String,
    pub email: String,
    pub address: String,
    pub tax_code: String,

    pub source: String,
    pub campaign: String,
    pub status: LeadStatus,
    /// Raw optionset code as stored remotely, kept for display/debugging.
    pub status_code: Option<i64>,

    // Lookup pairs: the name is what the UI shows, the id is the remote key.
    pub district: String,
    pub district_id: Option<String>,
    pub city: String,
    pub city_id: Option<String>,

    pub birth_date: Option<NaiveDate>,
    pub detailed_industry: Option<String>,
    pub detailed_industry_text: Option<String>,
    pub trade_name: Option<String>,
    pub supervisor: Option<String>,
    pub sales_staff: Option<String>,
    pub debt_staff: Option<String>,
    pub initial_potential: Option<String>,
    pub initial_general_info: Option<String>,
    pub rep_description: Option<String>,
    pub key_industry: Option<String>,
    pub sub_industry: Option<String>,
    pub store_type: Option<String>,

    pub created_on: Option<DateTime<Utc>>,
}

impl Default for Lead {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            initials: String::new(),
            avatar_color_class: String::new(),
            sub_info: String::new(),
            phone: String::new(),
            email: String::new(),
            address: String::new(),
            tax_code: String::new(),
            source: String::new(),
            campaign: String::new(),
            status: LeadStatus::Unknown,
            status_code: None,
            district: "N/A".to_string(),
            district_id: None,
            city: "N/A".to_string(),
            city_id: None,
            birth_date: None,
            detailed_industry: None,
            detailed_industry_text: None,
            trade_name: None,
            supervisor: None,
            sales_staff: None,
            debt_staff: None,
            initial_potential: None,
            initial_general_info: None,
            rep_description: None,
            key_industry: None,
            sub_industry: None,
            store_type: None,
            created_on: None,
        }
    }
}

/// Partial lead for writes. Only `Some` fields are mapped to the wire; UI-only
/// fields (initials, avatar color, sub info) have no counterpart here at all.
#[derive(Debug, Clone, Default)]
pub struct LeadPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub tax_code: Option<String>,
    pub source: Option<String>,
    pub campaign: Option<String>,
    pub status: Option<LeadStatus>,
    pub district: Option<String>,
    pub district_id: Option<String>,
    pub city: Option<String>,
    pub city_id: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub detailed_industry: Option<String>,
    pub trade_name: Option<String>,
    pub supervisor: Option<String>,
    pub sales_staff: Option<String>,
    pub debt_staff: Option<String>,
    pub initial_potential: Option<String>,
    pub initial_general_info: Option<String>,
    pub rep_description: Option<String>,
    pub key_industry: Option<String>,
    pub sub_industry: Option<String>,
    pub store_type: Option<String>,
}
