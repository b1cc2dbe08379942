//! Check catalog: call-site matchers and concrete checks

pub mod method_matcher;
pub mod xxe;

pub use method_matcher::{MethodMatcher, ParameterCriteria, TypeCriteria};
pub use xxe::{XxeProcessingCheck, SECURED, UNSECURED, XXE_CHECK_NAME, XXE_DOMAIN};
