pub mod google_ads;
