/// Logical names the admission check reads.
///
/// Defaults match the platform's standard case model; override them when the
/// pipeline uses customized schema names.
///
/// # Examples
///
/// ```
/// use case_admission::AdmissionConfig;
///
/// let config = AdmissionConfig::default().with_customer_field("new_accountid");
///
/// assert_eq!(config.customer_field(), "new_accountid");
/// assert_eq!(config.case_entity(), "incident");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionConfig {
    target_parameter: String,
    case_entity: String,
    customer_field: String,
    state_field: String,
}

impl AdmissionConfig {
    /// Default input parameter holding the record being created.
    pub const DEFAULT_TARGET_PARAMETER: &'static str = "Target";
    /// Default logical name of the case entity.
    pub const DEFAULT_CASE_ENTITY: &'static str = "incident";
    /// Default customer lookup field on a case.
    pub const DEFAULT_CUSTOMER_FIELD: &'static str = "customerid";
    /// Default lifecycle state field on a case.
    pub const DEFAULT_STATE_FIELD: &'static str = "statecode";

    /// Overrides the input parameter holding the target record.
    pub fn with_target_parameter(mut self, name: impl Into<String>) -> Self {
        self.target_parameter = name.into();
        self
    }

    /// Overrides the case entity name used by the existence query.
    pub fn with_case_entity(mut self, name: impl Into<String>) -> Self {
        self.case_entity = name.into();
        self
    }

    /// Overrides the customer lookup field.
    ///
    /// The same field is read from the target and filtered on in the query.
    pub fn with_customer_field(mut self, name: impl Into<String>) -> Self {
        self.customer_field = name.into();
        self
    }

    /// Overrides the lifecycle state field.
    pub fn with_state_field(mut self, name: impl Into<String>) -> Self {
        self.state_field = name.into();
        self
    }

    /// Returns the target input parameter name.
    pub fn target_parameter(&self) -> &str {
        &self.target_parameter
    }

    /// Returns the case entity name.
    pub fn case_entity(&self) -> &str {
        &self.case_entity
    }

    /// Returns the customer field name.
    pub fn customer_field(&self) -> &str {
        &self.customer_field
    }

    /// Returns the state field name.
    pub fn state_field(&self) -> &str {
        &self.state_field
    }
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            target_parameter: Self::DEFAULT_TARGET_PARAMETER.to_string(),
            case_entity: Self::DEFAULT_CASE_ENTITY.to_string(),
            customer_field: Self::DEFAULT_CUSTOMER_FIELD.to_string(),
            state_field: Self::DEFAULT_STATE_FIELD.to_string(),
        }
    }
}
