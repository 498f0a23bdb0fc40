//! Construction-time configuration for `Dictionary`.

use crate::dictionary::Dictionary;
use crate::error::DictError;
use crate::hashing::{HashFunction, SeedStrategy};
use crate::registry::CustomType;
use crate::value::TypeTag;

pub const DEFAULT_ARRAY_COUNT: u16 = 8;
pub const DEFAULT_ARRAY_SIZE: usize = 256;

/// Ownership of inserted keys and values.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum CopyMode {
    /// The dictionary keeps the caller's `Rc` and never copies or cleans up.
    Shallow,
    /// The dictionary stores its own copies and cleans them up on release.
    #[default]
    Deep,
}

/// Everything needed to build a `Dictionary`. Validated by `build`.
#[derive(Clone, Debug)]
pub struct DictionaryConfig {
    pub array_count: u16,
    pub array_size: usize,
    pub hash_function: HashFunction,
    pub seeds: SeedStrategy,
    pub key_type: TypeTag,
    pub value_type: TypeTag,
    pub copy_mode: CopyMode,
    /// Required when `key_type` is `TypeTag::Custom`.
    pub custom_key: Option<CustomType>,
    /// Required when `value_type` is `TypeTag::Custom`.
    pub custom_value: Option<CustomType>,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            array_count: DEFAULT_ARRAY_COUNT,
            array_size: DEFAULT_ARRAY_SIZE,
            hash_function: HashFunction::default(),
            seeds: SeedStrategy::default(),
            key_type: TypeTag::Str,
            value_type: TypeTag::Str,
            copy_mode: CopyMode::default(),
            custom_key: None,
            custom_value: None,
        }
    }
}

impl DictionaryConfig {
    pub fn build(self) -> Result<Dictionary, DictError> {
        Dictionary::from_config(self)
    }
}

/// Fluent wrapper over `DictionaryConfig`.
#[derive(Clone, Debug, Default)]
pub struct DictionaryBuilder {
    config: DictionaryConfig,
}

impl DictionaryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn array_count(mut self, n: u16) -> Self {
        self.config.array_count = n;
        self
    }

    pub fn array_size(mut self, n: usize) -> Self {
        self.config.array_size = n;
        self
    }

    pub fn hash_function(mut self, f: HashFunction) -> Self {
        self.config.hash_function = f;
        self
    }

    pub fn seeds(mut self, seeds: SeedStrategy) -> Self {
        self.config.seeds = seeds;
        self
    }

    pub fn key_type(mut self, tag: TypeTag) -> Self {
        self.config.key_type = tag;
        self
    }

    pub fn value_type(mut self, tag: TypeTag) -> Self {
        self.config.value_type = tag;
        self
    }

    pub fn copy_mode(mut self, mode: CopyMode) -> Self {
        self.config.copy_mode = mode;
        self
    }

    /// Set `key_type` to `Custom` with the given behavior.
    pub fn custom_key(mut self, custom: CustomType) -> Self {
        self.config.key_type = TypeTag::Custom;
        self.config.custom_key = Some(custom);
        self
    }

    /// Set `value_type` to `Custom` with the given behavior.
    pub fn custom_value(mut self, custom: CustomType) -> Self {
        self.config.value_type = TypeTag::Custom;
        self.config.custom_value = Some(custom);
        self
    }

    pub fn config(&self) -> &DictionaryConfig {
        &self.config
    }

    pub fn build(self) -> Result<Dictionary, DictError> {
        self.config.build()
    }
}

impl From<DictionaryConfig> for DictionaryBuilder {
    fn from(config: DictionaryConfig) -> Self {
        Self { config }
    }
}
