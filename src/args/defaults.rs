pub(crate) const DEFAULT_BASE_URL: &str = "http://localhost:8091";
pub(crate) const DEFAULT_USERS_PATH: &str = "data/login.csv";
pub(crate) const DEFAULT_PRODUCTS_PATH: &str = "data/products.csv";
