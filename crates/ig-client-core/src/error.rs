use ig_api_types::ImageHash;
use ig_gateway::GatewayError;
use ig_wallet::WalletError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GalleryError {
    #[error("no wallet provider is available")]
    ProviderUnavailable,
    #[error("wallet connection rejected: {0}")]
    ConnectionRejected(String),
    #[error("a connected wallet is required")]
    AuthRequired,
    #[error("search failed: {0}")]
    SearchFailed(#[source] GatewayError),
    #[error("failed to update like for {hash}: {source}")]
    LikeToggleFailed {
        hash: ImageHash,
        #[source]
        source: GatewayError,
    },
    #[error(transparent)]
    Transport(#[from] GatewayError),
}

impl From<WalletError> for GalleryError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::ProviderUnavailable => GalleryError::ProviderUnavailable,
            WalletError::ConnectionRejected(message) => GalleryError::ConnectionRejected(message),
        }
    }
}
