use chrono::NaiveDate;
use registry_core::{
    ApartmentFilter, HouseFilter, NewStudent, RegistryConfig, RegistryService, StudentFilter,
};

#[test]
fn address_chain_insert_and_list() {
    let service = memory_service();
    assert!(service.insert_street("Шевченка").ok);

    let street_id = street_id(&service, "Шевченка");
    assert!(service.insert_house("12", street_id).ok);
    let houses = service.list_houses(street_id).into_result().unwrap();
    assert_eq!(houses.len(), 1);
    assert_eq!(houses[0].number, "12");
    assert_eq!(houses[0].street_id, street_id);

    assert!(service.insert_apartment(5, houses[0].house_id).ok);
    let apartments = service
        .list_apartments(houses[0].house_id)
        .into_result()
        .unwrap();
    assert_eq!(apartments.len(), 1);
    assert_eq!(apartments[0].number, 5);
}

#[test]
fn street_without_houses_lists_empty() {
    let service = memory_service();
    assert!(service.insert_street("Тиха").ok);

    let outcome = service.list_houses(street_id(&service, "Тиха"));
    assert!(outcome.ok);
    assert_eq!(outcome.data, Some(Vec::new()));
    assert_eq!(outcome.error, None);
}

#[test]
fn house_on_missing_street_is_rejected_by_store() {
    let service = memory_service();

    let outcome = service.insert_house("1", 999);
    assert!(!outcome.ok);
    assert!(outcome.error.unwrap().contains("FOREIGN KEY"));

    let directory = service
        .list_house_directory(&HouseFilter::default())
        .into_result()
        .unwrap();
    assert!(directory.is_empty());
}

#[test]
fn apartment_on_missing_house_is_rejected_by_store() {
    let service = memory_service();

    assert!(!service.insert_apartment(1, 999).ok);
    assert!(service
        .list_apartment_directory(&ApartmentFilter::default())
        .into_result()
        .unwrap()
        .is_empty());
}

#[test]
fn duplicate_street_name_is_rejected() {
    let service = memory_service();
    assert!(service.insert_street("Соборна").ok);

    let outcome = service.insert_street("Соборна");
    assert!(!outcome.ok);
    assert!(outcome.error.unwrap().contains("UNIQUE"));
    assert_eq!(service.list_streets().into_result().unwrap().len(), 1);
}

#[test]
fn street_names_are_whitespace_normalized_on_insert() {
    let service = memory_service();
    assert!(service.insert_street("  Лесі   Українки ").ok);

    let streets = service.list_streets().into_result().unwrap();
    assert_eq!(streets[0].name, "Лесі Українки");
}

#[test]
fn blank_inputs_fail_validation() {
    let service = memory_service();

    assert_eq!(
        service.insert_street(" ").error.as_deref(),
        Some("street name must not be blank")
    );
    assert!(!service.insert_house("", 1).ok);
    assert!(!service.insert_house("7", 0).ok);
    assert!(!service.insert_apartment(3, -1).ok);
    assert!(!service.list_houses(0).ok);
    assert!(!service.delete_student(0).ok);
    assert!(!service.count_houses_matching("  ").ok);

    let blank_name = NewStudent::new("  ", dob(2000, 1, 1), "Ж", None, 1);
    assert!(!service.insert_student(&blank_name).ok);
    assert!(service.list_streets().into_result().unwrap().is_empty());
}

#[test]
fn student_insert_keeps_optional_comments() {
    let service = memory_service();
    let apartment_id = seed_apartment(&service, "Садова", "3", 8);

    let with_comment = NewStudent::new(
        "Олена Коваль",
        dob(2002, 11, 30),
        "Ж",
        Some("староста"),
        apartment_id,
    );
    let without_comment = NewStudent::new(
        "Андрій Мельник",
        dob(2001, 2, 14),
        "М",
        Some("  "),
        apartment_id,
    );
    assert!(service.insert_student(&with_comment).ok);
    assert!(service.insert_student(&without_comment).ok);

    let students = service
        .list_students(&StudentFilter::default())
        .into_result()
        .unwrap();
    assert_eq!(students.len(), 2);
    assert_eq!(students[0].full_name, "Андрій Мельник");
    assert_eq!(students[0].comments, None);
    assert_eq!(students[1].comments.as_deref(), Some("староста"));
    assert_eq!(students[1].date_of_birth, dob(2002, 11, 30));
    assert_eq!(students[1].name_street, "Садова");
    assert_eq!(students[1].house_number, "3");
    assert_eq!(students[1].apartment_number, 8);
}

#[test]
fn student_on_missing_apartment_is_rejected_by_store() {
    let service = memory_service();
    let student = NewStudent::new("Ніхто", dob(2000, 1, 1), "М", None, 42);

    let outcome = service.insert_student(&student);
    assert!(!outcome.ok);
    assert!(outcome.error.unwrap().contains("FOREIGN KEY"));
}

#[test]
fn delete_student_removes_only_that_student() {
    let service = memory_service();
    let apartment_id = seed_apartment(&service, "Шевченка", "12", 5);
    for name in ["Іван Петров", "Марія Шевчук"] {
        let student = NewStudent::new(name, dob(2000, 6, 1), "М", None, apartment_id);
        assert!(service.insert_student(&student).ok);
    }
    let before = service
        .list_students(&StudentFilter::default())
        .into_result()
        .unwrap();

    assert!(service.delete_student(before[0].student_id).ok);

    let after = service
        .list_students(&StudentFilter::default())
        .into_result()
        .unwrap();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].full_name, "Марія Шевчук");
    // The apartment stays in place.
    assert_eq!(
        service
            .list_apartment_directory(&ApartmentFilter::default())
            .into_result()
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn delete_missing_student_fails_and_changes_nothing() {
    let service = memory_service();
    let apartment_id = seed_apartment(&service, "Шевченка", "12", 5);
    let student = NewStudent::new("Іван Петров", dob(2000, 6, 1), "М", None, apartment_id);
    assert!(service.insert_student(&student).ok);

    let outcome = service.delete_student(12_345);
    assert!(!outcome.ok);
    assert_eq!(
        outcome.error.as_deref(),
        Some("sp_DeleteStudent: student 12345 does not exist")
    );
    assert_eq!(
        service
            .list_students(&StudentFilter::default())
            .into_result()
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn file_backed_store_persists_between_services() {
    let dir = tempfile::tempdir().unwrap();
    let config = RegistryConfig::with_file(dir.path().join("registry.sqlite3"));

    let writer = RegistryService::new(&config);
    assert!(writer.insert_street("Замкова").ok);
    drop(writer);

    let reader = RegistryService::new(&config);
    let streets = reader.list_streets().into_result().unwrap();
    assert_eq!(streets.len(), 1);
    assert_eq!(streets[0].name, "Замкова");
}

fn memory_service() -> RegistryService {
    RegistryService::new(&RegistryConfig::in_memory())
}

fn dob(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn street_id(service: &RegistryService, name: &str) -> i64 {
    service
        .list_streets()
        .into_result()
        .unwrap()
        .into_iter()
        .find(|street| street.name == name)
        .unwrap()
        .street_id
}

fn seed_apartment(service: &RegistryService, street: &str, house: &str, apartment: i64) -> i64 {
    assert!(service.insert_street(street).ok);
    let street_id = street_id(service, street);
    assert!(service.insert_house(house, street_id).ok);
    let house_id = service.list_houses(street_id).into_result().unwrap()[0].house_id;
    assert!(service.insert_apartment(apartment, house_id).ok);
    service.list_apartments(house_id).into_result().unwrap()[0].apartment_id
}
