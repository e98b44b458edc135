use crate::status::ErrorStatus;
use smartfield_lookup::LookupRow;

/// Change notification fired after a settlement, at most once per field and
/// only when the field actually changed.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEvent<K> {
    DisplayTextChanged {
        old: String,
        new: String,
    },
    ValueChanged {
        old: Option<K>,
        new: Option<K>,
    },
    CurrentRowChanged {
        old: Option<LookupRow<K>>,
        new: Option<LookupRow<K>>,
    },
    ErrorStatusChanged {
        old: Option<ErrorStatus>,
        new: Option<ErrorStatus>,
    },
    ChooserOpenChanged {
        old: bool,
        new: bool,
    },
    ChooserRegisteredChanged {
        old: bool,
        new: bool,
    },
}
