//! Pre-built Test Fixtures
//!
//! Known-good identifiers and an in-memory producer port seeded with
//! reference data. Fixtures are consistent and predictable so tests can
//! assert on exact values.

use std::sync::Arc;

use domain_rural::{City, Crop, MockProducerPort, State};
use domain_users::{MockTokenBlacklist, MockUserPort, User, UserService};

/// A valid CPF, digits only
pub const VALID_CPF: &str = "12345678909";

/// [`VALID_CPF`] with punctuation
pub const VALID_CPF_FORMATTED: &str = "123.456.789-09";

/// A second valid CPF
pub const OTHER_CPF: &str = "52998224725";

/// A valid CNPJ, digits only
pub const VALID_CNPJ: &str = "40993392000151";

/// [`VALID_CNPJ`] with punctuation
pub const VALID_CNPJ_FORMATTED: &str = "40.993.392/0001-51";

/// A second valid CNPJ
pub const OTHER_CNPJ: &str = "11222333000181";

/// A CPF with a wrong second check digit
pub const INVALID_CPF: &str = "12345678908";

/// A CNPJ with a wrong second check digit
pub const INVALID_CNPJ: &str = "40993392000152";

/// Email of the account created by [`seeded_users`]
pub const TEST_EMAIL: &str = "testuser@exemplo.com";

/// Password of the account created by [`seeded_users`]
pub const TEST_PASSWORD: &str = "testpassword";

/// Mock producer port plus the reference data it was seeded with
#[derive(Debug, Clone)]
pub struct SeededProducerPort {
    pub port: MockProducerPort,
    pub sao_paulo: State,
    pub minas_gerais: State,
    pub campinas: City,
    pub ribeirao_preto: City,
    pub uberaba: City,
    /// The initial crop catalogue, in insertion order
    pub crops: Vec<Crop>,
}

impl SeededProducerPort {
    /// Looks a seeded crop up by name
    ///
    /// # Panics
    ///
    /// Panics if no crop has that name
    pub fn crop(&self, name: &str) -> &Crop {
        self.crops
            .iter()
            .find(|c| c.name == name)
            .unwrap_or_else(|| panic!("crop {name} not seeded"))
    }
}

/// Creates a mock port with two states, three cities and the initial crops
pub async fn seeded_producer_port() -> SeededProducerPort {
    let port = MockProducerPort::new();
    let sao_paulo = port.add_state("São Paulo", "SP").await;
    let minas_gerais = port.add_state("Minas Gerais", "MG").await;
    let campinas = port.add_city("Campinas", sao_paulo.id).await;
    let ribeirao_preto = port.add_city("Ribeirão Preto", sao_paulo.id).await;
    let uberaba = port.add_city("Uberaba", minas_gerais.id).await;
    let crops = port.seed_initial_crops().await;

    SeededProducerPort {
        port,
        sao_paulo,
        minas_gerais,
        campinas,
        ribeirao_preto,
        uberaba,
        crops,
    }
}

/// Lowest bcrypt cost, keeps hashing in tests fast
pub const TEST_BCRYPT_COST: u32 = 4;

/// Mock user storage holding one active account
#[derive(Clone)]
pub struct SeededUsers {
    pub port: MockUserPort,
    pub blacklist: MockTokenBlacklist,
    pub service: UserService,
    /// The account for [`TEST_EMAIL`] / [`TEST_PASSWORD`]
    pub user: User,
}

/// Creates mock user storage with the [`TEST_EMAIL`] account
///
/// # Panics
///
/// Panics if the account cannot be created
pub async fn seeded_users() -> SeededUsers {
    let port = MockUserPort::new();
    let service = UserService::new(Arc::new(port.clone())).with_bcrypt_cost(TEST_BCRYPT_COST);
    let user = service
        .create_user(TEST_EMAIL, "Test User", TEST_PASSWORD)
        .await
        .expect("test user created");

    SeededUsers {
        port,
        blacklist: MockTokenBlacklist::new(),
        service,
        user,
    }
}
