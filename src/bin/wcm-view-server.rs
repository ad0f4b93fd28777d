//! Main entry point for WcmViewServer

#![deny(warnings, missing_docs, trivial_casts, unused_qualifications)]
#![forbid(unsafe_code)]

use wcm_view_server::application::WCM_VIEW_SERVER_APP;

/// Boot WcmViewServer
fn main() {
    abscissa_core::boot(&WCM_VIEW_SERVER_APP);
}
