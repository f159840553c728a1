// src/app/lead_form.rs

use validator::ValidationErrors;

use crate::{
    common::{error::AppError, validation},
    models::{
        lead::{Department, Lead, LeadPatch},
        reference::{ChoiceOption, Employee},
    },
    services::LookupCache,
};

// --- field access table ---

/// Fields rendered by the edit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Phone,
    Email,
    Address,
    TaxCode,
    Source,
    Campaign,
    District,
    Province,
    Supervisor,
    SalesStaff,
    DebtStaff,
    BirthDate,
    DetailedIndustry,
    TradeName,
    InitialPotential,
    InitialGeneralInfo,
    RepDescription,
    KeyIndustry,
    SubIndustry,
    StoreType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAccess {
    Editable,
    ReadOnly,
    Hidden,
}

/// Per-role access table, consumed generically by the renderer. Marketing
/// edits only the contact/location subset and never sees the sales-side
/// fields; Sale edits everything.
pub fn field_access(role: Department, field: FormField) -> FieldAccess {
    use FieldAccess::*;
    use FormField::*;

    if role != Department::Marketing {
        return Editable;
    }
    match field {
        Name | Phone | TaxCode | Address | District | Province => Editable,
        Email | Source | Campaign | BirthDate => ReadOnly,
        Supervisor | SalesStaff | DebtStaff | DetailedIndustry | TradeName | InitialPotential
        | InitialGeneralInfo | RepDescription | KeyIndustry | SubIndustry | StoreType => Hidden,
    }
}

// --- multi-select persistence ---

/// Which token a multi-select field persists into its comma-joined string.
/// Fixed per field; never inferred at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiValueToken {
    Label,
    Code,
}

pub const MULTI_SELECT_TOKENS: &[(FormField, MultiValueToken)] = &[
    (FormField::DetailedIndustry, MultiValueToken::Code),
    (FormField::KeyIndustry, MultiValueToken::Label),
    (FormField::SubIndustry, MultiValueToken::Label),
    (FormField::StoreType, MultiValueToken::Label),
];

pub fn multi_value_token(field: FormField) -> Option<MultiValueToken> {
    MULTI_SELECT_TOKENS
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, t)| *t)
}

pub fn join_choices(selected: &[ChoiceOption], token: MultiValueToken) -> String {
    selected
        .iter()
        .map(|c| match token {
            MultiValueToken::Label => c.label.clone(),
            MultiValueToken::Code => c.value.to_string(),
        })
        .collect::<Vec<_>>()
        .join(",")
}

// --- form state ---

/// Working state of the single-lead edit form: a mutable copy of the lead,
/// the role it is being edited under, and the derived picker state.
pub struct LeadFormState {
    role: Department,
    lead: Lead,
    saving: bool,
    sales_staff: Vec<Employee>,
}

impl LeadFormState {
    pub fn new(role: Department, lead: Lead) -> Self {
        Self {
            role,
            lead,
            saving: false,
            sales_staff: Vec::new(),
        }
    }

    pub fn lead(&self) -> &Lead {
        &self.lead
    }

    pub fn lead_mut(&mut self) -> &mut Lead {
        &mut self.lead
    }

    pub fn sales_staff(&self) -> &[Employee] {
        &self.sales_staff
    }

    /// Sale can always edit; Marketing only while the lead is still pending
    /// confirmation.
    pub fn is_editable(&self) -> bool {
        self.role != Department::Marketing || self.lead.status.is_pending()
    }

    /// What a single control derives its `disabled` state from: the
    /// editability flag, the in-flight save, and the role's access table.
    pub fn can_edit(&self, field: FormField) -> bool {
        self.is_editable() && !self.saving && field_access(self.role, field) == FieldAccess::Editable
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn begin_save(&mut self) {
        self.saving = true;
    }

    pub fn finish_save(&mut self) {
        self.saving = false;
    }

    // --- derivations, in causal order ---

    /// 1. Selecting a district always auto-fills (and overwrites) its
    /// province, then runs the province-change derivations.
    pub async fn select_district(&mut self, district_id: &str, district_name: &str, cache: &LookupCache) {
        self.lead.district = district_name.to_string();
        self.lead.district_id = Some(district_id.to_string());

        if let Some((province_id, province_name)) = cache.province_for_district(district_id).await {
            self.lead.city = province_name;
            self.lead.city_id = Some(province_id);
        } else {
            self.lead.city = "N/A".to_string();
            self.lead.city_id = None;
        }
        self.on_province_changed(cache).await;
    }

    /// 2 + 3. Province changes refresh the supervisor (Sale only — Marketing
    /// never sees the field) and the province-filtered sales staff picker.
    /// The previous staff list stays visible until the fetch settles; an
    /// empty result was already replaced by the unfiltered superset inside
    /// the cache.
    pub async fn on_province_changed(&mut self, cache: &LookupCache) {
        let Some(province_id) = self.lead.city_id.clone() else {
            return;
        };

        if self.role != Department::Marketing {
            self.lead.supervisor = cache.supervisor_for_province(&province_id).await;
        }

        let staff = cache.sales_staff_for_province(&province_id).await;
        if !staff.is_empty() {
            self.sales_staff = staff.as_ref().clone();
        }
    }

    // --- save-time validation ---

    /// Evaluated at save time rather than input time so auto-filled values
    /// are covered too. All failures are reported together.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = ValidationErrors::new();

        let phone = self.lead.phone.trim();
        if phone.is_empty() {
            validation::push_field_error(
                &mut errors,
                "phone",
                "required",
                "Số điện thoại là bắt buộc",
            );
        } else if !validation::is_valid_phone(phone) {
            validation::push_field_error(
                &mut errors,
                "phone",
                "invalid_phone",
                "Số điện thoại phải là 0 + 9 số hoặc +84 + 9 số",
            );
        }

        if !validation::is_valid_tax_code(&self.lead.tax_code) {
            validation::push_field_error(
                &mut errors,
                "taxCode",
                "invalid_tax_code",
                "Mã số thuế phải gồm 10, 12 hoặc 13 chữ số",
            );
        }

        let district = self.lead.district.trim();
        if district.is_empty() || district == "N/A" {
            validation::push_field_error(
                &mut errors,
                "district",
                "required",
                "Quận/Huyện là bắt buộc",
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.into())
        }
    }

    /// The patch sent on save: every field the current role may edit, plus
    /// the location ids backing the lookup binds.
    pub fn patch(&self) -> LeadPatch {
        let lead = &self.lead;
        let mut patch = LeadPatch {
            name: Some(lead.name.clone()),
            phone: Some(lead.phone.clone()),
            tax_code: Some(lead.tax_code.clone()),
            address: Some(lead.address.clone()),
            district: Some(lead.district.clone()),
            district_id: lead.district_id.clone(),
            city: Some(lead.city.clone()),
            city_id: lead.city_id.clone(),
            ..Default::default()
        };
        if self.role != Department::Marketing {
            patch.email = Some(lead.email.clone());
            patch.source = Some(lead.source.clone());
            patch.campaign = Some(lead.campaign.clone());
            patch.birth_date = lead.birth_date;
            patch.detailed_industry = lead.detailed_industry.clone();
            patch.trade_name = lead.trade_name.clone();
            patch.supervisor = lead.supervisor.clone();
            patch.sales_staff = lead.sales_staff.clone();
            patch.debt_staff = lead.debt_staff.clone();
            patch.initial_potential = lead.initial_potential.clone();
            patch.initial_general_info = lead.initial_general_info.clone();
            patch.rep_description = lead.rep_description.clone();
            patch.key_industry = lead.key_industry.clone();
            patch.sub_industry = lead.sub_industry.clone();
            patch.store_type = lead.store_type.clone();
        }
        patch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataverse::ReferenceStore;
    use crate::models::lead::LeadStatus;
    use crate::models::reference::{District, Province};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct StaticReferenceStore {
        province_staff: Vec<Employee>,
    }

    #[async_trait]
    impl ReferenceStore for StaticReferenceStore {
        async fn fetch_districts(&self) -> Result<Vec<District>, AppError> {
            Ok(vec![
                District {
                    id: "d1".to_string(),
                    name: "Quận 1".to_string(),
                    province_id: Some("p1".to_string()),
                    province_name: Some("TP. Hồ Chí Minh".to_string()),
                },
                District {
                    id: "d2".to_string(),
                    name: "Quận Ba Đình".to_string(),
                    province_id: Some("p2".to_string()),
                    province_name: Some("Hà Nội".to_string()),
                },
            ])
        }

        async fn fetch_provinces(&self) -> Result<Vec<Province>, AppError> {
            Ok(vec![Province {
                id: "p1".to_string(),
                name: "TP. Hồ Chí Minh".to_string(),
                supervisor: Some("Trần Thị B".to_string()),
            }])
        }

        async fn fetch_employees(&self, _d: Option<&str>) -> Result<Vec<Employee>, AppError> {
            Ok(vec![Employee {
                id: "e9".to_string(),
                name: "Toàn bộ".to_string(),
                department: None,
                province_id: None,
            }])
        }

        async fn fetch_employees_by_province(
            &self,
            _d: Option<&str>,
            _p: &str,
        ) -> Result<Vec<Employee>, AppError> {
            Ok(self.province_staff.clone())
        }

        async fn fetch_choice_options(
            &self,
            _e: &str,
            _a: &str,
        ) -> Result<Vec<ChoiceOption>, AppError> {
            Ok(Vec::new())
        }
    }

    fn cache(province_staff: Vec<Employee>) -> LookupCache {
        LookupCache::new(Arc::new(StaticReferenceStore { province_staff }))
    }

    fn lead_with_status(status: LeadStatus) -> Lead {
        Lead {
            name: "Công ty X".to_string(),
            phone: "0912345678".to_string(),
            district: "Quận 1".to_string(),
            status,
            ..Default::default()
        }
    }

    #[test]
    fn marketing_cannot_edit_a_confirmed_lead() {
        let form = LeadFormState::new(
            Department::Marketing,
            lead_with_status(LeadStatus::MarketingConfirmed),
        );
        assert!(!form.is_editable());
        assert!(!form.can_edit(FormField::Name));
    }

    #[test]
    fn sale_can_edit_the_same_lead() {
        let form = LeadFormState::new(
            Department::Sale,
            lead_with_status(LeadStatus::MarketingConfirmed),
        );
        assert!(form.is_editable());
        assert!(form.can_edit(FormField::Supervisor));
    }

    #[test]
    fn marketing_can_edit_while_pending_but_only_its_subset() {
        let form = LeadFormState::new(Department::Marketing, lead_with_status(LeadStatus::Pending));
        assert!(form.is_editable());
        assert!(form.can_edit(FormField::Phone));
        assert!(!form.can_edit(FormField::Supervisor)); // hidden
        assert!(!form.can_edit(FormField::Source)); // read-only
    }

    #[test]
    fn in_flight_save_disables_everything() {
        let mut form = LeadFormState::new(Department::Sale, lead_with_status(LeadStatus::Pending));
        form.begin_save();
        assert!(!form.can_edit(FormField::Name));
        form.finish_save();
        assert!(form.can_edit(FormField::Name));
    }

    #[tokio::test]
    async fn selecting_a_district_overwrites_the_province() {
        let cache = cache(Vec::new());
        let mut form = LeadFormState::new(Department::Sale, lead_with_status(LeadStatus::Pending));
        form.lead_mut().city = "Hà Nội".to_string();
        form.lead_mut().city_id = Some("p2".to_string());

        form.select_district("d1", "Quận 1", &cache).await;
        assert_eq!(form.lead().city, "TP. Hồ Chí Minh");
        assert_eq!(form.lead().city_id.as_deref(), Some("p1"));
    }

    #[tokio::test]
    async fn province_change_fills_supervisor_for_sale_only() {
        let cache = cache(Vec::new());

        let mut sale = LeadFormState::new(Department::Sale, lead_with_status(LeadStatus::Pending));
        sale.select_district("d1", "Quận 1", &cache).await;
        assert_eq!(sale.lead().supervisor.as_deref(), Some("Trần Thị B"));

        let cache = self::cache(Vec::new());
        let mut marketing =
            LeadFormState::new(Department::Marketing, lead_with_status(LeadStatus::Pending));
        marketing.select_district("d1", "Quận 1", &cache).await;
        assert_eq!(marketing.lead().supervisor, None);
    }

    #[tokio::test]
    async fn empty_filtered_staff_falls_back_to_the_full_picker() {
        let cache = cache(Vec::new()); // province query yields nothing
        let mut form = LeadFormState::new(Department::Sale, lead_with_status(LeadStatus::Pending));
        form.select_district("d1", "Quận 1", &cache).await;
        let names: Vec<_> = form.sales_staff().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Toàn bộ"]);
    }

    #[test]
    fn save_validation_accumulates_every_failure() {
        let mut lead = lead_with_status(LeadStatus::Pending);
        lead.phone = "12345".to_string();
        lead.tax_code = "12345678901".to_string(); // 11 digits
        lead.district = "N/A".to_string();
        let form = LeadFormState::new(Department::Sale, lead);

        let err = form.validate().unwrap_err();
        let AppError::ValidationError(errors) = err else {
            panic!("expected validation error");
        };
        let fields = errors.field_errors();
        assert!(fields.contains_key("phone"));
        assert!(fields.contains_key("taxCode"));
        assert!(fields.contains_key("district"));
    }

    #[test]
    fn valid_form_passes() {
        let form = LeadFormState::new(Department::Sale, lead_with_status(LeadStatus::Pending));
        assert!(form.validate().is_ok());
    }

    #[test]
    fn multi_select_tokens_are_fixed_per_field() {
        assert_eq!(
            multi_value_token(FormField::DetailedIndustry),
            Some(MultiValueToken::Code)
        );
        assert_eq!(
            multi_value_token(FormField::KeyIndustry),
            Some(MultiValueToken::Label)
        );
        assert_eq!(multi_value_token(FormField::Phone), None);

        let options = vec![
            ChoiceOption {
                value: 100,
                label: "Bán lẻ".to_string(),
            },
            ChoiceOption {
                value: 200,
                label: "Bán sỉ".to_string(),
            },
        ];
        assert_eq!(join_choices(&options, MultiValueToken::Code), "100,200");
        assert_eq!(
            join_choices(&options, MultiValueToken::Label),
            "Bán lẻ,Bán sỉ"
        );
    }

    #[test]
    fn marketing_patch_is_restricted_to_its_subset() {
        let mut lead = lead_with_status(LeadStatus::Pending);
        lead.supervisor = Some("Ai đó".to_string());
        lead.email = "x@y.vn".to_string();
        let form = LeadFormState::new(Department::Marketing, lead);

        let patch = form.patch();
        assert!(patch.name.is_some());
        assert!(patch.supervisor.is_none());
        assert!(patch.email.is_none());
    }
}
