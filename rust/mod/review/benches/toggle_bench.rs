use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use opencourse_sql::{SQLStore, SqliteStore};
use review::model::NewUser;
use review::store::{CourseStore, UserStore};
use review::{ActivityConfig, Actor, InteractionInput, ReviewModule, UserRole};

fn setup() -> (ReviewModule, Actor, i64) {
    let db: Arc<dyn SQLStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
    let activity = ActivityConfig::from_toml_str("[interaction]\nadd = 5\nlike = 1\nunlike = -1").unwrap();
    let module = ReviewModule::new(db, activity).unwrap();
    let ex = module.store().as_executor();

    let author = UserStore
        .create(
            ex,
            &NewUser {
                name: "author".into(),
                email: "author@example.edu".into(),
                role: UserRole::User,
            },
        )
        .unwrap();
    let fan = UserStore
        .create(
            ex,
            &NewUser {
                name: "fan".into(),
                email: "fan@example.edu".into(),
                role: UserRole::User,
            },
        )
        .unwrap();
    let course = CourseStore.create(ex, "BN101", "Benchmarks", None).unwrap();
    let review = module
        .coordinator()
        .add_or_update_interaction(
            &Actor::from(&author),
            course.id,
            &InteractionInput::new(Some("fast"), Some(10)),
        )
        .unwrap();

    (module, Actor::from(&fan), review.id)
}

fn bench_like_unlike(c: &mut Criterion) {
    let (module, fan, id) = setup();
    let svc = module.coordinator();

    c.bench_function("like_unlike_cycle", |b| {
        b.iter(|| {
            assert!(svc.like_interaction(&fan, black_box(id)).unwrap());
            assert!(svc.unlike_interaction(&fan, black_box(id)).unwrap());
        });
    });
}

fn bench_repeat_like_noop(c: &mut Criterion) {
    let (module, fan, id) = setup();
    let svc = module.coordinator();
    svc.like_interaction(&fan, id).unwrap();

    c.bench_function("like_noop", |b| {
        b.iter(|| {
            assert!(!svc.like_interaction(&fan, black_box(id)).unwrap());
        });
    });
}

fn bench_course_listing(c: &mut Criterion) {
    let (module, _, _) = setup();
    let ex = module.store().as_executor();
    let course = CourseStore.create(ex, "BN200", "Listing", None).unwrap();
    for i in 0..500 {
        let user = UserStore
            .create(
                ex,
                &NewUser {
                    name: format!("u{i}"),
                    email: format!("u{i}@example.edu"),
                    role: UserRole::User,
                },
            )
            .unwrap();
        module
            .coordinator()
            .add_or_update_interaction(&Actor::from(&user), course.id, &InteractionInput::new(Some("ok"), None))
            .unwrap();
    }

    c.bench_function("interactions_for_course_500", |b| {
        b.iter(|| {
            let rows = module.coordinator().interactions_for_course(black_box(course.id)).unwrap();
            assert_eq!(rows.len(), 500);
        });
    });
}

criterion_group!(benches, bench_like_unlike, bench_repeat_like_noop, bench_course_listing);
criterion_main!(benches);
