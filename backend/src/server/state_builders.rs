//! Builders wiring repositories into the driving-port services.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use yamdb::domain::ports::{
    CommentRepository, Notifier, ReviewRepository, TaxonomyRepository, TitleRepository,
    UserRepository,
};
use yamdb::domain::{
    AuthService, CatalogueService, CodeGenerator, CommentThreadService, RandomCodeGenerator,
    ReviewLedgerService, TokenSigner, UserAdminService,
};
use yamdb::inbound::http::state::HttpState;
use yamdb::outbound::memory::MemoryStore;
use yamdb::outbound::persistence::{
    DbPool, DieselCommentRepository, DieselReviewRepository, DieselTaxonomyRepository,
    DieselTitleRepository, DieselUserRepository,
};

use super::ServerConfig;

/// One adapter per driven port.
struct Repositories<U, X, T, R, C> {
    users: Arc<U>,
    taxa: Arc<X>,
    titles: Arc<T>,
    reviews: Arc<R>,
    comments: Arc<C>,
}

fn memory_repositories(
    store: MemoryStore,
) -> Repositories<MemoryStore, MemoryStore, MemoryStore, MemoryStore, MemoryStore> {
    let store = Arc::new(store);
    Repositories {
        users: store.clone(),
        taxa: store.clone(),
        titles: store.clone(),
        reviews: store.clone(),
        comments: store,
    }
}

fn diesel_repositories(
    pool: &DbPool,
) -> Repositories<
    DieselUserRepository,
    DieselTaxonomyRepository,
    DieselTitleRepository,
    DieselReviewRepository,
    DieselCommentRepository,
> {
    Repositories {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        taxa: Arc::new(DieselTaxonomyRepository::new(pool.clone())),
        titles: Arc::new(DieselTitleRepository::new(pool.clone())),
        reviews: Arc::new(DieselReviewRepository::new(pool.clone())),
        comments: Arc::new(DieselCommentRepository::new(pool.clone())),
    }
}

/// Services shared by every worker, independent of the store.
struct Collaborators<N> {
    notifier: Arc<N>,
    codes: Arc<dyn CodeGenerator>,
    clock: Arc<dyn Clock>,
    signer: TokenSigner,
}

fn assemble<U, X, T, R, C, N>(
    repos: Repositories<U, X, T, R, C>,
    with: Collaborators<N>,
    config: &ServerConfig,
) -> HttpState
where
    U: UserRepository + 'static,
    X: TaxonomyRepository + 'static,
    T: TitleRepository + 'static,
    R: ReviewRepository + 'static,
    C: CommentRepository + 'static,
    N: Notifier + 'static,
{
    let Repositories {
        users,
        taxa,
        titles,
        reviews,
        comments,
    } = repos;

    HttpState {
        auth: Arc::new(AuthService::new(
            users.clone(),
            with.notifier,
            with.codes,
            with.signer,
            config.auth,
        )),
        users: Arc::new(UserAdminService::new(users)),
        catalogue: Arc::new(CatalogueService::new(taxa, titles.clone())),
        reviews: Arc::new(ReviewLedgerService::new(
            titles,
            reviews.clone(),
            with.clock.clone(),
        )),
        comments: Arc::new(CommentThreadService::new(reviews, comments, with.clock)),
    }
}

/// Build the shared HTTP state, selecting PostgreSQL when a pool is
/// configured and the in-memory store otherwise.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let collaborators = Collaborators {
        notifier: Arc::new(config.notifier.clone()),
        codes: Arc::new(RandomCodeGenerator),
        clock: clock.clone(),
        signer: TokenSigner::new(config.token_secret.to_vec(), config.token_ttl, clock),
    };

    let state = match &config.db_pool {
        Some(pool) => assemble(diesel_repositories(pool), collaborators, config),
        None => assemble(memory_repositories(MemoryStore::new()), collaborators, config),
    };
    web::Data::new(state)
}
