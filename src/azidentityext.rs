mod access_token_credential;
pub mod device_code;

pub use access_token_credential::AccessTokenCredential;
pub use device_code::DeviceCodeFlow;
