mod download_repository;

pub use download_repository::DownloadRepository;
