//! Route gating by authentication state.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Entry point; redirects to `Home` or `Login`.
    Root,
    Login,
    Register,
    Activate,
    Home,
    SearchPets,
    AddPet,
}

impl Route {
    /// Protected routes require an authenticated session.
    pub fn is_protected(self) -> bool {
        matches!(self, Route::Home | Route::SearchPets | Route::AddPet)
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Root => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Activate => "/activate",
            Route::Home => "/home",
            Route::SearchPets => "/pets/search",
            Route::AddPet => "/pets/new",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Route actually shown for a requested route.
pub fn resolve(requested: Route, authenticated: bool) -> Route {
    match requested {
        Route::Root if authenticated => Route::Home,
        Route::Root => Route::Login,
        route if route.is_protected() && !authenticated => Route::Login,
        route => route,
    }
}
