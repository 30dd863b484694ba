// Adapters layer: concrete implementations of the collaborator ports.

pub mod fetcher;
pub mod openai;
pub mod tavily;

pub use self::fetcher::HttpTextFetcher;
pub use self::openai::OpenAiClient;
pub use self::tavily::TavilySearch;
