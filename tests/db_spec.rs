use carmaker::db::Database;
use carmaker::error::Error;
use carmaker::models::*;
use speculate2::speculate;

fn create_maker(db: &Database, name: &str) -> Manufacturer {
    db.create_manufacturer(CreateManufacturerInput {
        name: name.to_string(),
    })
    .expect("Failed to create manufacturer")
}

fn create_engine(db: &Database, name: &str, displacement: f64) -> Engine {
    db.create_engine(CreateEngineInput {
        name: name.to_string(),
        displacement,
    })
    .expect("Failed to create engine")
}

fn create_model(db: &Database, name: &str, year: i32) -> VehicleModel {
    db.create_vehicle_model(ModelDraft {
        model: Some(name.to_string()),
        year: Some(year),
        ..Default::default()
    })
    .expect("Failed to create model")
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
    }

    describe "open" {
        it "persists data across reopen" {
            let _ = &db;
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let path = dir.path().join("data").join("carmaker.db");
            {
                let file_db = Database::open(path.clone()).expect("Failed to open");
                file_db.migrate().expect("Failed to migrate");
                create_maker(&file_db, "Saab");
            }

            let file_db = Database::open(path).expect("Failed to reopen");
            file_db.migrate().expect("Failed to migrate");
            assert_eq!(file_db.get_all_manufacturers().expect("Query failed").len(), 1);
        }
    }

    describe "manufacturers" {
        it "creates and fetches by id" {
            let created = create_maker(&db, "Saab");
            let found = db.get_manufacturer(created.id).expect("Query failed");
            assert_eq!(found, Some(created));
        }

        it "returns None for a missing id" {
            assert!(db.get_manufacturer(42).expect("Query failed").is_none());
        }

        it "finds all rows matching a name" {
            create_maker(&db, "Saab");
            create_maker(&db, "Saab");
            create_maker(&db, "Volvo");

            let matches = db.find_manufacturers_by_name("Saab").expect("Query failed");
            assert_eq!(matches.len(), 2);
        }

        it "deleting a referenced manufacturer nulls the model's maker" {
            let maker = create_maker(&db, "Saab");
            let model = db.create_vehicle_model(ModelDraft {
                model: Some("9-5".to_string()),
                year: Some(2003),
                maker: Some(Some(maker.id)),
                ..Default::default()
            }).expect("Failed to create model");

            assert!(db.delete_manufacturer(maker.id).expect("Failed to delete"));

            let model = db.get_model(model.id).expect("Query failed").expect("Model gone");
            assert_eq!(model.maker, None);
        }
    }

    describe "engines" {
        describe "filter_engines" {
            before {
                create_engine(&db, "V6", 3.0);
                create_engine(&db, "V8", 4.4);
                create_engine(&db, "V8", 5.0);
                create_engine(&db, "Diesel", 2.2);
            }

            it "returns the union over all filter arms" {
                let engines = db.filter_engines(&[
                    EngineFilter { name: Some("V6".to_string()), displacement: None },
                    EngineFilter { name: Some("V8".to_string()), displacement: None },
                ]).expect("Query failed");

                let names: Vec<&str> = engines.iter().map(|e| e.name.as_str()).collect();
                assert_eq!(names, vec!["V6", "V8", "V8"]);
            }

            it "accepts arms that match nothing" {
                let engines = db.filter_engines(&[
                    EngineFilter { name: Some("W16".to_string()), displacement: None },
                    EngineFilter { name: Some("Diesel".to_string()), displacement: None },
                ]).expect("Query failed");
                assert_eq!(engines.len(), 1);
            }

            it "conjoins fields within one arm" {
                let engines = db.filter_engines(&[EngineFilter {
                    name: Some("V8".to_string()),
                    displacement: Some(5.0),
                }]).expect("Query failed");
                assert_eq!(engines.len(), 1);
                assert_eq!(engines[0].displacement, 5.0);
            }

            it "returns nothing for an empty filter list" {
                assert!(db.filter_engines(&[]).expect("Query failed").is_empty());
            }
        }
    }

    describe "projects" {
        it "rejects a duplicate code name with Conflict" {
            db.create_project(CreateProjectInput { code_name: "Gripen".to_string() })
                .expect("Failed to create project");

            let err = db.create_project(CreateProjectInput { code_name: "Gripen".to_string() })
                .expect_err("Duplicate code name should fail");
            assert!(matches!(err, Error::Conflict(_)));
        }
    }

    describe "create_vehicle_model" {
        it "requires model and year" {
            let err = db.create_vehicle_model(ModelDraft::default())
                .expect_err("Empty draft should fail");
            assert!(matches!(err, Error::Validation(_)));
        }

        it "creates a fresh project from a pending code name" {
            let model = db.create_vehicle_model(ModelDraft {
                model: Some("9-3".to_string()),
                year: Some(2005),
                project: ProjectField::Pending("Sonett".to_string()),
                ..Default::default()
            }).expect("Failed to create model");

            let project_id = model.project.expect("Model should own a project");
            let project = db.get_project(project_id).expect("Query failed").expect("Project gone");
            assert_eq!(project.code_name, "Sonett");
        }

        it "fails with Conflict when the pending code name already exists" {
            db.create_project(CreateProjectInput { code_name: "Sonett".to_string() })
                .expect("Failed to create project");

            let err = db.create_vehicle_model(ModelDraft {
                model: Some("9-3".to_string()),
                year: Some(2005),
                project: ProjectField::Pending("Sonett".to_string()),
                ..Default::default()
            }).expect_err("Colliding code name should fail");
            assert!(matches!(err, Error::Conflict(_)));

            // Rolled back: no model row was written.
            assert!(db.get_all_models().expect("Query failed").is_empty());
        }

        it "fails with NotFound for an unknown explicit project id" {
            let err = db.create_vehicle_model(ModelDraft {
                model: Some("9-3".to_string()),
                year: Some(2005),
                project: ProjectField::Id(Some(99)),
                ..Default::default()
            }).expect_err("Unknown project id should fail");
            assert!(matches!(err, Error::NotFound(_)));
        }

        it "writes the engine reference set" {
            let v6 = create_engine(&db, "V6", 3.0);
            let v8 = create_engine(&db, "V8", 4.4);

            let model = db.create_vehicle_model(ModelDraft {
                model: Some("9-5".to_string()),
                year: Some(2003),
                engine_options: Some(vec![v6.id, v8.id]),
                ..Default::default()
            }).expect("Failed to create model");

            assert_eq!(model.engine_options, vec![v6.id, v8.id]);
        }
    }

    describe "update_vehicle_model" {
        it "replaces the project when the code name changes" {
            let model = db.create_vehicle_model(ModelDraft {
                model: Some("9-3".to_string()),
                year: Some(2005),
                project: ProjectField::Pending("Alpha".to_string()),
                ..Default::default()
            }).expect("Failed to create model");
            let old_project_id = model.project.expect("Model should own a project");

            let updated = db.update_vehicle_model(model, ModelDraft {
                project: ProjectField::Pending("Beta".to_string()),
                ..Default::default()
            }).expect("Failed to update model");

            let new_project_id = updated.project.expect("Model should own a project");
            assert_ne!(new_project_id, old_project_id);
            // The old project row must no longer resolve by id.
            assert!(db.get_project(old_project_id).expect("Query failed").is_none());
            let new_project = db.get_project(new_project_id).expect("Query failed").expect("Project gone");
            assert_eq!(new_project.code_name, "Beta");
        }

        it "performs no project write when the code name is unchanged" {
            let model = db.create_vehicle_model(ModelDraft {
                model: Some("9-3".to_string()),
                year: Some(2005),
                project: ProjectField::Pending("Alpha".to_string()),
                ..Default::default()
            }).expect("Failed to create model");
            let project_id = model.project.expect("Model should own a project");

            let updated = db.update_vehicle_model(model, ModelDraft {
                project: ProjectField::Pending("Alpha".to_string()),
                ..Default::default()
            }).expect("Failed to update model");

            // Same row, not a recreated one.
            assert_eq!(updated.project, Some(project_id));
        }

        it "leaves the association untouched when the field is absent" {
            let model = db.create_vehicle_model(ModelDraft {
                model: Some("9-3".to_string()),
                year: Some(2005),
                project: ProjectField::Pending("Alpha".to_string()),
                ..Default::default()
            }).expect("Failed to create model");
            let project_id = model.project;

            let updated = db.update_vehicle_model(model, ModelDraft {
                year: Some(2006),
                ..Default::default()
            }).expect("Failed to update model");

            assert_eq!(updated.year, 2006);
            assert_eq!(updated.project, project_id);
        }

        it "rolls back the whole write when the replacement project collides" {
            db.create_project(CreateProjectInput { code_name: "Taken".to_string() })
                .expect("Failed to create project");

            let model = db.create_vehicle_model(ModelDraft {
                model: Some("9-3".to_string()),
                year: Some(2005),
                project: ProjectField::Pending("Alpha".to_string()),
                ..Default::default()
            }).expect("Failed to create model");
            let project_id = model.project.expect("Model should own a project");
            let model_id = model.id;

            let err = db.update_vehicle_model(model, ModelDraft {
                year: Some(2010),
                project: ProjectField::Pending("Taken".to_string()),
                ..Default::default()
            }).expect_err("Colliding replacement should fail");
            assert!(matches!(err, Error::Conflict(_)));

            // No orphaned project, no partial model update.
            let model = db.get_model(model_id).expect("Query failed").expect("Model gone");
            assert_eq!(model.year, 2005);
            assert_eq!(model.project, Some(project_id));
            let project = db.get_project(project_id).expect("Query failed").expect("Project gone");
            assert_eq!(project.code_name, "Alpha");
        }

        it "clears the association on an explicit null id" {
            let model = db.create_vehicle_model(ModelDraft {
                model: Some("9-3".to_string()),
                year: Some(2005),
                project: ProjectField::Pending("Alpha".to_string()),
                ..Default::default()
            }).expect("Failed to create model");

            let updated = db.update_vehicle_model(model, ModelDraft {
                project: ProjectField::Id(None),
                ..Default::default()
            }).expect("Failed to update model");

            assert_eq!(updated.project, None);
        }

        it "rewrites the engine set" {
            let v6 = create_engine(&db, "V6", 3.0);
            let v8 = create_engine(&db, "V8", 4.4);
            let model = db.create_vehicle_model(ModelDraft {
                model: Some("9-5".to_string()),
                year: Some(2003),
                engine_options: Some(vec![v6.id]),
                ..Default::default()
            }).expect("Failed to create model");

            let updated = db.update_vehicle_model(model, ModelDraft {
                engine_options: Some(vec![v8.id]),
                ..Default::default()
            }).expect("Failed to update model");

            assert_eq!(updated.engine_options, vec![v8.id]);
        }
    }

    describe "vehicles" {
        it "cascade-deletes vehicles when their model is deleted" {
            let model = create_model(&db, "9-5", 2003);
            let vehicle = db.create_vehicle(CreateVehicleInput {
                vin: "YS3ED48E5Y3070016".to_string(),
                model: model.id,
            }).expect("Failed to create vehicle");

            assert!(db.delete_model(model.id).expect("Failed to delete"));
            assert!(db.get_vehicle(vehicle.id).expect("Query failed").is_none());
        }

        it "rejects a vehicle referencing a missing model" {
            let err = db.create_vehicle(CreateVehicleInput {
                vin: "YS3ED48E5Y3070016".to_string(),
                model: 999,
            }).expect_err("Missing model should fail");
            assert!(matches!(err, Error::NotFound(_)));
        }
    }

    describe "engineers" {
        it "creates an engineer with a works_on set" {
            let model = create_model(&db, "9-5", 2003);
            let engineer = db.create_engineer(CreateEngineerInput {
                name: "Ljungström".to_string(),
                works_on: vec![model.id],
            }).expect("Failed to create engineer");

            let found = db.get_engineer(engineer.id).expect("Query failed").expect("Engineer gone");
            assert_eq!(found.works_on, vec![model.id]);
        }

        it "lists engineers for a model with their full works_on sets" {
            let a = create_model(&db, "9-3", 2005);
            let b = create_model(&db, "9-5", 2003);
            db.create_engineer(CreateEngineerInput {
                name: "Ljungström".to_string(),
                works_on: vec![a.id, b.id],
            }).expect("Failed to create engineer");

            let engineers = db.get_engineers_for_model(a.id).expect("Query failed");
            assert_eq!(engineers.len(), 1);
            assert_eq!(engineers[0].works_on, vec![a.id, b.id]);
        }

        it "survives the deletion of a model it works on" {
            let model = create_model(&db, "9-5", 2003);
            let engineer = db.create_engineer(CreateEngineerInput {
                name: "Ljungström".to_string(),
                works_on: vec![model.id],
            }).expect("Failed to create engineer");

            db.delete_model(model.id).expect("Failed to delete");

            let found = db.get_engineer(engineer.id).expect("Query failed").expect("Engineer gone");
            assert!(found.works_on.is_empty());
        }

        it "filters by name with union semantics" {
            create_model(&db, "9-5", 2003);
            db.create_engineer(CreateEngineerInput { name: "Ljungström".to_string(), works_on: vec![] })
                .expect("Failed to create engineer");
            db.create_engineer(CreateEngineerInput { name: "Nilsson".to_string(), works_on: vec![] })
                .expect("Failed to create engineer");

            let engineers = db.filter_engineers(&[
                EngineerFilter { name: Some("Nilsson".to_string()) },
                EngineerFilter { name: Some("Nobody".to_string()) },
            ]).expect("Query failed");
            assert_eq!(engineers.len(), 1);
            assert_eq!(engineers[0].name, "Nilsson");
        }
    }
}
