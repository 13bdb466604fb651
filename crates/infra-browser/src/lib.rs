// Browser Infrastructure - remote DevTools page fetcher

mod fetcher;

pub use fetcher::CdpPageFetcher;
