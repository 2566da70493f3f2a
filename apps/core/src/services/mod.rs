//! Outbound collaborators: the weather provider and the delivery channels.

pub mod console;
pub mod telegram;
pub mod traits;
pub mod weather;

pub use console::ConsoleChannel;
pub use telegram::TelegramChannel;
pub use traits::{DeliveryChannel, WeatherLookup};
pub use weather::{OpenWeatherClient, WeatherOutcome, WeatherReport};
