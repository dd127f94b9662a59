pub mod models;
pub mod retry;
pub mod traits;
pub mod ytdlp;

pub use models::{Format, PlaylistEntry, PlaylistInfo, StreamDescriptor, VideoInfo, VideoMetadata};
pub use retry::{retry, RetryPolicy, UserAgentPool};
pub use traits::{DownloadRequest, Extractor};
pub use ytdlp::YtDlpExtractor;
