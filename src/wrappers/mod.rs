use crate::input::{Input, InputForProcessing};
use crate::ReportFlags;
#[cfg(feature = "demo")]
use crate::wrappers::demo_data::DemoDataWrapper;

#[cfg(feature = "demo")]
pub mod demo_data;

/// Common trait for a wrapper in front of the core calculation, which in its preprocessing stage
/// is able to rewrite the reporting document before the emissions ledger is built from it.
pub(crate) trait ReportWrapper {
    fn apply_preprocessing(
        &self,
        input: InputForProcessing,
        flags: &ReportFlags,
    ) -> anyhow::Result<Input>;
}

/// A wrapper that does nothing, so can be used in cases when the reporting document
/// should be passed directly to the core without mutation.
pub(crate) struct PassthroughWrapper;

impl PassthroughWrapper {
    pub(crate) fn new() -> Self {
        Self {}
    }
}

impl ReportWrapper for PassthroughWrapper {
    fn apply_preprocessing(
        &self,
        input: InputForProcessing,
        _flags: &ReportFlags,
    ) -> anyhow::Result<Input> {
        Ok(input.finalize())
    }
}

pub(crate) enum ChosenWrapper {
    Passthrough(PassthroughWrapper),
    #[cfg(feature = "demo")]
    DemoData(DemoDataWrapper),
}

impl ReportWrapper for ChosenWrapper {
    fn apply_preprocessing(
        &self,
        input: InputForProcessing,
        flags: &ReportFlags,
    ) -> anyhow::Result<Input> {
        match self {
            ChosenWrapper::Passthrough(wrapper) => wrapper.apply_preprocessing(input, flags),
            #[cfg(feature = "demo")]
            ChosenWrapper::DemoData(wrapper) => wrapper.apply_preprocessing(input, flags),
        }
    }
}
