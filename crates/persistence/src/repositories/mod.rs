//! Repository implementations for database operations.

pub mod account;
pub mod health;
pub mod house;
pub mod invite;
pub mod member;
pub mod onboarding_settings;
pub mod profile;

pub use account::AccountRepository;
pub use health::PoolHealth;
pub use house::HouseRepository;
pub use invite::InviteRepository;
pub use member::MemberRepository;
pub use onboarding_settings::OnboardingSettingsRepository;
pub use profile::ProfileRepository;
