//! Stored option values for one interface.

use smallvec::SmallVec;

use skein_interface::HandleOption;

/// Options explicitly set on an interface; unset ones read as their
/// defaults.
#[derive(Clone, Debug, Default)]
pub(crate) struct OptionSet {
    values: SmallVec<[(HandleOption, i32); 4]>,
}

impl OptionSet {
    pub fn get(&self, option: HandleOption) -> i32 {
        self.values
            .iter()
            .find(|(o, _)| *o == option)
            .map_or_else(|| option.default_value(), |(_, v)| *v)
    }

    pub fn flag(&self, option: HandleOption) -> bool {
        self.get(option) != 0
    }

    /// Set an option. Connection-required and connection-optional are
    /// complements; setting one sets the other.
    pub fn set(&mut self, option: HandleOption, value: i32) {
        let complement = match option {
            HandleOption::ConnectionRequired => Some(HandleOption::ConnectionOptional),
            HandleOption::ConnectionOptional => Some(HandleOption::ConnectionRequired),
            _ => None,
        };
        self.put(option, value);
        if let Some(other) = complement {
            self.put(other, i32::from(value == 0));
        }
    }

    fn put(&mut self, option: HandleOption, value: i32) {
        match self.values.iter_mut().find(|(o, _)| *o == option) {
            Some(entry) => entry.1 = value,
            None => self.values.push((option, value)),
        }
    }
}
