pub mod session;
pub mod csv_import;
pub mod chat_context;

pub mod analysis {
    pub mod aggregate;
    pub mod theoretical_pace;
    pub mod consistency;
    pub mod costly_mistake;
    pub mod pace_degradation;
    pub mod sector_fingerprint;
    pub mod pit_stops;

    pub mod comparative;
    pub mod narrative;
}

pub mod models {
    pub mod driver;
    pub mod lap;
    pub mod race_result;
}

pub mod helpers {
    pub mod time;
    pub mod math;
    pub mod general;

    pub mod config;
    pub mod logging;
}
