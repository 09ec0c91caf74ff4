use chrono::NaiveDate;
use registry_core::db::collation::{compare_names, fold_case};
use registry_core::{
    best_match, NewStudent, RegistryConfig, RegistryService, StudentFilter, StudentRow,
};

#[test]
fn list_students_matches_every_filter_combination() {
    let fixture = Fixture::seed();
    let everyone = fixture.list(&StudentFilter::default());
    assert_eq!(everyone.len(), 4);

    let combinations = [
        (None, None),
        (Some(fixture.shevchenka_id), None),
        (None, Some("Петр")),
        (Some(fixture.shevchenka_id), Some("Петр")),
        (Some(fixture.franka_id), Some("Петр")),
        (Some(fixture.franka_id), Some("Шевчук")),
    ];
    for (street_id, text) in combinations {
        let filter = StudentFilter {
            street_id,
            search_text: text.map(str::to_string),
        };
        let expected = everyone
            .iter()
            .filter(|row| street_id.map_or(true, |id| row.street_id == id))
            .filter(|row| {
                text.map_or(true, |text| fold_case(&row.full_name).contains(&fold_case(text)))
            })
            .cloned()
            .collect::<Vec<_>>();

        let actual = fixture.list(&filter);
        assert_eq!(actual, expected, "street={street_id:?} text={text:?}");
        assert!(actual
            .windows(2)
            .all(|pair| compare_names(&pair[0].full_name, &pair[1].full_name).is_le()));
    }
}

#[test]
fn no_filters_returns_everyone_sorted_by_name() {
    let fixture = Fixture::seed();
    let names = fixture
        .list(&StudentFilter::default())
        .into_iter()
        .map(|row| row.full_name)
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        ["Іван Петров", "Марія Шевчук", "Олена Коваль", "Петро Іваненко"]
    );
}

#[test]
fn street_filter_with_text_narrows_to_one_student() {
    let fixture = Fixture::seed();
    let rows = fixture.list(&StudentFilter {
        street_id: Some(fixture.shevchenka_id),
        search_text: Some("Петр".to_string()),
    });

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].full_name, "Іван Петров");
    assert_eq!(rows[0].name_street, "Шевченка");
    assert_eq!(rows[0].house_number, "12");
    assert_eq!(rows[0].apartment_number, 5);
}

#[test]
fn blank_text_and_non_positive_street_act_as_absent() {
    let fixture = Fixture::seed();
    let rows = fixture.list(&StudentFilter {
        street_id: Some(0),
        search_text: Some("   ".to_string()),
    });
    assert_eq!(rows.len(), 4);
}

#[test]
fn like_wildcards_in_search_text_match_literally() {
    let fixture = Fixture::seed();
    for text in ["%", "_", "Іван%"] {
        let rows = fixture.list(&StudentFilter {
            street_id: None,
            search_text: Some(text.to_string()),
        });
        assert!(rows.is_empty(), "text={text}");
    }
}

#[test]
fn street_without_students_yields_empty_success() {
    let fixture = Fixture::seed();
    assert!(fixture.service.insert_street("Порожня").ok);
    let empty_id = fixture
        .service
        .list_streets()
        .into_result()
        .unwrap()
        .into_iter()
        .find(|street| street.name == "Порожня")
        .unwrap()
        .street_id;

    let outcome = fixture.service.list_students(&StudentFilter {
        street_id: Some(empty_id),
        search_text: None,
    });
    assert!(outcome.ok);
    assert_eq!(outcome.data, Some(Vec::new()));
}

#[test]
fn names_sort_alphabetically_and_search_ignores_cyrillic_case() {
    let service = RegistryService::new(&RegistryConfig::in_memory());
    let (_, apartment_id) = seed_apartment(&service, "Шевченка", "12", 5);
    for name in ["Іван Петров", "Андрій Мельник", "Юлія Бойко", "Єва Гнатюк"] {
        let student = NewStudent::new(
            name,
            NaiveDate::from_ymd_opt(2002, 4, 12).unwrap(),
            "Ж",
            None,
            apartment_id,
        );
        assert!(service.insert_student(&student).ok);
    }

    let names = |search_text: Option<&str>| {
        service
            .list_students(&StudentFilter {
                street_id: None,
                search_text: search_text.map(str::to_string),
            })
            .into_result()
            .unwrap()
            .into_iter()
            .map(|row| row.full_name)
            .collect::<Vec<_>>()
    };

    assert_eq!(
        names(None),
        ["Андрій Мельник", "Єва Гнатюк", "Іван Петров", "Юлія Бойко"]
    );
    assert_eq!(names(Some("іван")), ["Іван Петров"]);
    assert_eq!(names(Some("ПЕТРОВ")), ["Іван Петров"]);
    assert_eq!(names(Some("юЛІЯ")), ["Юлія Бойко"]);
}

#[test]
fn best_match_prefers_name_prefix_over_substring() {
    let fixture = Fixture::seed();
    let rows = fixture.list(&StudentFilter {
        street_id: None,
        search_text: Some("Петр".to_string()),
    });
    assert_eq!(rows.len(), 2);

    let best = best_match(&rows, "Петр").unwrap();
    assert_eq!(best.full_name, "Петро Іваненко");
}

struct Fixture {
    service: RegistryService,
    shevchenka_id: i64,
    franka_id: i64,
}

impl Fixture {
    fn seed() -> Self {
        let service = RegistryService::new(&RegistryConfig::in_memory());
        let shevchenka = seed_apartment(&service, "Шевченка", "12", 5);
        let franka = seed_apartment(&service, "Франка", "3", 14);

        for (name, apartment_id) in [
            ("Іван Петров", shevchenka.1),
            ("Петро Іваненко", franka.1),
            ("Марія Шевчук", shevchenka.1),
            ("Олена Коваль", franka.1),
        ] {
            let student = NewStudent::new(
                name,
                NaiveDate::from_ymd_opt(2003, 9, 1).unwrap(),
                "Ж",
                None,
                apartment_id,
            );
            assert!(service.insert_student(&student).ok);
        }

        Self {
            service,
            shevchenka_id: shevchenka.0,
            franka_id: franka.0,
        }
    }

    fn list(&self, filter: &StudentFilter) -> Vec<StudentRow> {
        self.service.list_students(filter).into_result().unwrap()
    }
}

/// Returns `(street_id, apartment_id)`.
fn seed_apartment(
    service: &RegistryService,
    street: &str,
    house: &str,
    apartment: i64,
) -> (i64, i64) {
    assert!(service.insert_street(street).ok);
    let street_id = service
        .list_streets()
        .into_result()
        .unwrap()
        .into_iter()
        .find(|row| row.name == street)
        .unwrap()
        .street_id;
    assert!(service.insert_house(house, street_id).ok);
    let house_id = service.list_houses(street_id).into_result().unwrap()[0].house_id;
    assert!(service.insert_apartment(apartment, house_id).ok);
    let apartment_id = service.list_apartments(house_id).into_result().unwrap()[0].apartment_id;
    (street_id, apartment_id)
}
