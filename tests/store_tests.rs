use quickslot::store::{CourseUpdate, NewCourse, UndoAction};
use quickslot::{Broadcaster, ChangeEvent, ScheduleStore, StoreError};
use tempfile::TempDir;

const TERM: &str = "fall-2026";

fn store() -> (TempDir, ScheduleStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ScheduleStore::new(dir.path(), Broadcaster::default());
    (dir, store)
}

fn new_course(code: &str, number: &str, slot: Option<&str>) -> NewCourse {
    NewCourse {
        code: code.to_string(),
        number: number.to_string(),
        name: "Principles".to_string(),
        instructor: "TBA".to_string(),
        room: "DB 100".to_string(),
        slot_id: slot.map(|s| s.to_string()),
    }
}

#[test]
fn test_load_sin_archivo_devuelve_documento_vacio() {
    let (_dir, store) = store();
    let doc = store.load(TERM).expect("Debe cargar documento vacío");
    assert!(doc.courses.is_empty());
    assert!(store.sections_for_term(TERM).unwrap().is_empty());
}

#[test]
fn test_archivo_corrupto_es_error() {
    let (_dir, store) = store();
    std::fs::write(store.term_path(TERM).unwrap(), "{not json").unwrap();
    assert!(matches!(store.load(TERM), Err(StoreError::Corrupt { .. })));
}

#[test]
fn test_lee_documento_con_slot_null() {
    let (_dir, store) = store();
    let json = r#"{
        "courses": [
            {"id": "ECON-205-1", "code": "ECON", "number": "205", "section": "1",
             "name": "Principles of Macroeconomics", "days": "", "startTime": "", "endTime": "",
             "instructor": "TBA", "room": "DB 100", "slotId": null}
        ],
        "instructors": [],
        "timeSlots": {}
    }"#;
    std::fs::write(store.term_path(TERM).unwrap(), json).unwrap();
    let secs = store.sections_for_term(TERM).unwrap();
    assert_eq!(secs.len(), 1);
    assert_eq!(secs[0].slot_id, None);
}

#[test]
fn test_add_course_numera_secciones() {
    let (_dir, store) = store();
    let c1 = store.add_course(TERM, new_course("econ", "205", None)).unwrap();
    let c2 = store.add_course(TERM, new_course("ECON", "205", Some("MW-A"))).unwrap();
    let other = store.add_course(TERM, new_course("MGMT", "205", None)).unwrap();
    assert_eq!(c1.id, "ECON-205-1");
    assert_eq!(c1.code, "ECON");
    assert_eq!(c2.id, "ECON-205-2");
    assert_eq!(c2.slot_id.as_deref(), Some("MW-A"));
    assert_eq!(other.section, "1");
    assert_eq!(store.sections_for_term(TERM).unwrap().len(), 3);
}

#[test]
fn test_add_course_requiere_codigo_y_numero() {
    let (_dir, store) = store();
    let err = store.add_course(TERM, new_course("  ", "205", None)).unwrap_err();
    assert!(matches!(err, StoreError::Invalid(_)));
}

#[test]
fn test_move_course_valida_franja_y_curso() {
    let (_dir, store) = store();
    let c = store.add_course(TERM, new_course("ECON", "205", None)).unwrap();

    store.move_course(TERM, &c.id, Some("TR-EVE".to_string())).unwrap();
    assert_eq!(store.sections_for_term(TERM).unwrap()[0].slot_id.as_deref(), Some("TR-EVE"));

    assert!(matches!(
        store.move_course(TERM, &c.id, Some("XX-Q".to_string())),
        Err(StoreError::UnknownSlot(_))
    ));
    assert!(matches!(
        store.move_course(TERM, "NOPE-1-1", Some("MW-A".to_string())),
        Err(StoreError::CourseNotFound(_))
    ));

    // sin franja => queda sin asignar
    store.move_course(TERM, &c.id, None).unwrap();
    assert_eq!(store.sections_for_term(TERM).unwrap()[0].slot_id, None);
}

#[test]
fn test_update_course_solo_campos_presentes() {
    let (_dir, store) = store();
    let c = store.add_course(TERM, new_course("ECON", "205", None)).unwrap();
    let updates = CourseUpdate { instructor: Some("Keynes".to_string()), ..Default::default() };
    store.update_course(TERM, &c.id, updates).unwrap();
    let s = &store.sections_for_term(TERM).unwrap()[0];
    assert_eq!(s.instructor, "Keynes");
    assert_eq!(s.room, "DB 100");
    assert_eq!(s.name, "Principles");
}

#[test]
fn test_faculty_agrega_ordena_y_elimina() {
    let (_dir, store) = store();
    assert!(store.add_faculty(TERM, " Smith ").unwrap());
    assert!(store.add_faculty(TERM, "Adams").unwrap());
    assert!(!store.add_faculty(TERM, "Smith").unwrap());
    assert_eq!(store.faculty(TERM).unwrap(), vec!["Adams".to_string(), "Smith".to_string()]);
    assert!(matches!(store.add_faculty(TERM, "   "), Err(StoreError::Invalid(_))));

    assert!(store.delete_faculty(TERM, "Adams").unwrap());
    assert!(!store.delete_faculty(TERM, "Adams").unwrap());
    assert_eq!(store.faculty(TERM).unwrap(), vec!["Smith".to_string()]);
}

#[test]
fn test_undo_move_restaura_franja_y_sala() {
    let (_dir, store) = store();
    let c = store.add_course(TERM, new_course("ECON", "205", Some("MW-A"))).unwrap();
    store.move_course(TERM, &c.id, Some("MW-B".to_string())).unwrap();

    let action: UndoAction = serde_json::from_str(
        r#"{"type": "move", "courseId": "ECON-205-1", "slotId": "MW-A", "room": "DB 300"}"#,
    )
    .expect("Debe parsear undo");
    store.undo(TERM, action).unwrap();
    let s = &store.sections_for_term(TERM).unwrap()[0];
    assert_eq!(s.slot_id.as_deref(), Some("MW-A"));
    assert_eq!(s.room, "DB 300");
}

#[test]
fn test_undo_delete_y_update() {
    let (_dir, store) = store();
    let c = store.add_course(TERM, new_course("ECON", "205", None)).unwrap();
    store
        .undo(TERM, UndoAction::Update {
            course_id: c.id.clone(),
            updates: CourseUpdate { room: Some("ONLINE".to_string()), ..Default::default() },
        })
        .unwrap();
    assert_eq!(store.sections_for_term(TERM).unwrap()[0].room, "ONLINE");

    store.undo(TERM, UndoAction::Delete { course_id: c.id.clone() }).unwrap();
    assert!(store.sections_for_term(TERM).unwrap().is_empty());
}

#[test]
fn test_mutaciones_publican_eventos() {
    let (_dir, store) = store();
    let mut rx = store.broadcaster().subscribe();

    let c = store.add_course(TERM, new_course("ECON", "205", None)).unwrap();
    store.move_course(TERM, &c.id, Some("MW-C".to_string())).unwrap();
    store.add_faculty(TERM, "Smith").unwrap();
    // duplicado: no publica
    store.add_faculty(TERM, "Smith").unwrap();
    store.delete_course(TERM, &c.id).unwrap();

    let names: Vec<&'static str> = std::iter::from_fn(|| rx.try_recv().ok())
        .map(|e| e.name())
        .collect();
    assert_eq!(names, vec!["course_added", "schedule_update", "faculty_added", "course_deleted"]);
}

#[test]
fn test_evento_schedule_update_serializa() {
    let (_dir, store) = store();
    let mut rx = store.broadcaster().subscribe();
    let c = store.add_course(TERM, new_course("ECON", "205", None)).unwrap();
    store.move_course(TERM, &c.id, Some("SAT".to_string())).unwrap();
    let _added = rx.try_recv().unwrap();
    let moved = rx.try_recv().unwrap();
    assert!(matches!(moved, ChangeEvent::ScheduleUpdate { .. }));
    let v = serde_json::to_value(&moved).unwrap();
    assert_eq!(v["event"], "schedule_update");
    assert_eq!(v["courseId"], "ECON-205-1");
    assert_eq!(v["slotId"], "SAT");
    assert_eq!(v["term"], TERM);
}

#[test]
fn test_export_json_nombre_y_contenido() {
    let (_dir, store) = store();
    store.add_course(TERM, new_course("ECON", "205", Some("MW-A"))).unwrap();
    let export = store.export_json(TERM).unwrap();
    assert!(export.file_name.starts_with("schedule_"));
    assert!(export.file_name.ends_with(".json"));
    // schedule_YYYYmmdd_HHMMSS.json
    assert_eq!(export.file_name.len(), "schedule_20261018_120000.json".len());
    let v: serde_json::Value = serde_json::from_slice(&export.bytes).unwrap();
    assert_eq!(v["courses"][0]["slotId"], "MW-A");
}

#[test]
fn test_termino_invalido_no_toca_disco() {
    let (dir, store) = store();
    assert!(matches!(store.term_path("../x"), Err(StoreError::Invalid(_))));
    assert!(matches!(store.load("../x"), Err(StoreError::Invalid(_))));
    assert!(matches!(
        store.add_course("../x", new_course("ECON", "205", None)),
        Err(StoreError::Invalid(_))
    ));
    assert!(matches!(store.add_faculty("a/b", "Smith"), Err(StoreError::Invalid(_))));
    assert!(matches!(store.load("   "), Err(StoreError::Invalid(_))));
    // no se crea nada en disco
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_termino_con_espacios_comparte_archivo() {
    let (_dir, store) = store();
    store.add_course("Fall 2026", new_course("ECON", "205", None)).unwrap();
    assert_eq!(store.term_path("Fall 2026").unwrap(), store.term_path(TERM).unwrap());
    assert_eq!(store.sections_for_term(TERM).unwrap().len(), 1);
}

#[test]
fn test_terminos_separados() {
    let (_dir, store) = store();
    store.add_course(TERM, new_course("ECON", "205", None)).unwrap();
    assert!(store.sections_for_term("spring-2027").unwrap().is_empty());
}
