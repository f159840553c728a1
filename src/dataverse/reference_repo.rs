// src/dataverse/reference_repo.rs

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::{
    common::error::AppError,
    models::reference::{ChoiceOption, District, Employee, Province},
};

use super::{
    client::DataverseClient,
    lead_mapper::{DISTRICT_ENTITY_SET, EMPLOYEE_ENTITY_SET, PROVINCE_ENTITY_SET},
    query::{QueryOptions, escape_literal},
};

/// Employees whose work status equals this sentinel never appear in pickers.
pub const RESIGNED_SENTINEL: &str = "Nghỉ việc";

const FORMATTED: &str = "@OData.Community.Display.V1.FormattedValue";

/// Port over the small read-only reference tables (districts, provinces,
/// employees, picklist metadata).
#[async_trait]
pub trait ReferenceStore: Send + Sync {
    async fn fetch_districts(&self) -> Result<Vec<District>, AppError>;
    async fn fetch_provinces(&self) -> Result<Vec<Province>, AppError>;
    async fn fetch_employees(&self, department: Option<&str>) -> Result<Vec<Employee>, AppError>;
    async fn fetch_employees_by_province(
        &self,
        department: Option<&str>,
        province_id: &str,
    ) -> Result<Vec<Employee>, AppError>;
    async fn fetch_choice_options(
        &self,
        entity: &str,
        attribute: &str,
    ) -> Result<Vec<ChoiceOption>, AppError>;
}

#[derive(Clone)]
pub struct ReferenceRepository {
    client: Arc<DataverseClient>,
}

impl ReferenceRepository {
    pub fn new(client: Arc<DataverseClient>) -> Self {
        Self { client }
    }

    fn employee_filter(department: Option<&str>, province_id: Option<&str>) -> String {
        let mut clauses = vec![format!(
            "crdfd_workstatus ne '{}'",
            escape_literal(RESIGNED_SENTINEL)
        )];
        if let Some(department) = department {
            clauses.push(format!(
                "contains(crdfd_department,'{}')",
                escape_literal(department)
            ));
        }
        if let Some(province_id) = province_id {
            clauses.push(format!("_crdfd_province_value eq {province_id}"));
        }
        clauses.join(" and ")
    }

    fn employee_of(row: &Map<String, Value>) -> Employee {
        Employee {
            id: str_of(row, "crdfd_employeeid"),
            name: str_of(row, "crdfd_name"),
            department: opt_of(row, "crdfd_department"),
            province_id: opt_of(row, "_crdfd_province_value"),
        }
    }
}

#[async_trait]
impl ReferenceStore for ReferenceRepository {
    /// Each district row carries its province lookup, so the formatted
    /// annotation resolves the one-hop district → province join in a single
    /// request.
    async fn fetch_districts(&self) -> Result<Vec<District>, AppError> {
        let options = QueryOptions::new()
            .select(&["crdfd_districtid", "crdfd_name", "_crdfd_province_value"])
            .order_by("crdfd_name asc");
        let rows = self.client.get_list(DISTRICT_ENTITY_SET, &options).await?;
        Ok(rows
            .iter()
            .map(|row| District {
                id: str_of(row, "crdfd_districtid"),
                name: str_of(row, "crdfd_name"),
                province_id: opt_of(row, "_crdfd_province_value"),
                province_name: opt_of(row, &format!("_crdfd_province_value{FORMATTED}")),
            })
            .collect())
    }

    async fn fetch_provinces(&self) -> Result<Vec<Province>, AppError> {
        let options = QueryOptions::new()
            .select(&["crdfd_provinceid", "crdfd_name", "crdfd_supervisorname"])
            .order_by("crdfd_name asc");
        let rows = self.client.get_list(PROVINCE_ENTITY_SET, &options).await?;
        Ok(rows
            .iter()
            .map(|row| Province {
                id: str_of(row, "crdfd_provinceid"),
                name: str_of(row, "crdfd_name"),
                supervisor: opt_of(row, "crdfd_supervisorname"),
            })
            .collect())
    }

    async fn fetch_employees(&self, department: Option<&str>) -> Result<Vec<Employee>, AppError> {
        let options = QueryOptions::new()
            .select(&[
                "crdfd_employeeid",
                "crdfd_name",
                "crdfd_department",
                "_crdfd_province_value",
            ])
            .filter(Self::employee_filter(department, None))
            .order_by("crdfd_name asc");
        let rows = self.client.get_list(EMPLOYEE_ENTITY_SET, &options).await?;
        Ok(rows.iter().map(Self::employee_of).collect())
    }

    async fn fetch_employees_by_province(
        &self,
        department: Option<&str>,
        province_id: &str,
    ) -> Result<Vec<Employee>, AppError> {
        let options = QueryOptions::new()
            .select(&[
                "crdfd_employeeid",
                "crdfd_name",
                "crdfd_department",
                "_crdfd_province_value",
            ])
            .filter(Self::employee_filter(department, Some(province_id)))
            .order_by("crdfd_name asc");
        let rows = self.client.get_list(EMPLOYEE_ENTITY_SET, &options).await?;
        Ok(rows.iter().map(Self::employee_of).collect())
    }

    /// Optionset labels come from the metadata API, not the entity set.
    async fn fetch_choice_options(
        &self,
        entity: &str,
        attribute: &str,
    ) -> Result<Vec<ChoiceOption>, AppError> {
        let path = format!(
            "EntityDefinitions(LogicalName='{entity}')/Attributes(LogicalName='{attribute}')/Microsoft.Dynamics.CRM.PicklistAttributeMetadata"
        );
        let options = QueryOptions {
            select: vec!["LogicalName"],
            ..Default::default()
        };
        // $expand is not part of QueryOptions; metadata is the one caller.
        let body = self
            .client
            .get(&format!("{path}?$expand=OptionSet($select=Options)"), &options)
            .await?;

        let mut choices = Vec::new();
        if let Some(options) = body
            .get("OptionSet")
            .and_then(|o| o.get("Options"))
            .and_then(Value::as_array)
        {
            for option in options {
                let value = option.get("Value").and_then(Value::as_i64);
                let label = option
                    .get("Label")
                    .and_then(|l| l.get("UserLocalizedLabel"))
                    .and_then(|l| l.get("Label"))
                    .and_then(Value::as_str);
                if let (Some(value), Some(label)) = (value, label) {
                    choices.push(ChoiceOption {
                        value,
                        label: label.to_string(),
                    });
                }
            }
        }
        Ok(choices)
    }
}

fn str_of(row: &Map<String, Value>, attr: &str) -> String {
    row.get(attr)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn opt_of(row: &Map<String, Value>, attr: &str) -> Option<String> {
    row.get(attr)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
