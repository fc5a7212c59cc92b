#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    pub retain_facts: bool,
    pub cache_walks: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            retain_facts: true,
            cache_walks: false,
        }
    }
}
