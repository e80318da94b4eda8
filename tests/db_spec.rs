use projectboard::db::Database;
use projectboard::models::*;
use speculate2::speculate;

fn project_input(name: &str) -> CreateProjectInput {
    CreateProjectInput {
        name: name.to_string(),
        description: None,
        financial_results: None,
        features: vec![],
    }
}

fn feature_input(name: &str) -> CreateFeatureInput {
    CreateFeatureInput {
        name: name.to_string(),
        description: None,
        tasks: vec![],
    }
}

fn task_input(name: &str) -> CreateTaskInput {
    CreateTaskInput {
        name: name.to_string(),
        description: None,
        status: None,
    }
}

fn create_test_project(db: &Database) -> Project {
    db.create_project(project_input("Test Project"))
        .expect("Failed to create project")
}

fn create_test_feature(db: &Database, project_id: i64) -> Feature {
    db.create_feature(project_id, feature_input("Test Feature"))
        .expect("Failed to create feature")
        .expect("Project should exist")
}

fn create_test_task(db: &Database, feature_id: i64) -> Task {
    db.create_task(feature_id, task_input("Test Task"))
        .expect("Failed to create task")
        .expect("Feature should exist")
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
    }

    describe "projects" {
        describe "create_project" {
            it "creates a project with required fields" {
                let project = db.create_project(project_input("My Project"))
                    .expect("Failed to create project");

                assert_eq!(project.name, "My Project");
                assert!(project.description.is_none());
                assert!(project.financial_results.is_none());
            }

            it "creates a project with all fields" {
                let project = db.create_project(CreateProjectInput {
                    name: "Site".to_string(),
                    description: Some("Redesign".to_string()),
                    financial_results: Some("ROI 12%".to_string()),
                    features: vec![],
                }).expect("Failed to create project");

                let found = db.get_project(project.id).expect("Query failed").unwrap();
                assert_eq!(found, project);
                assert_eq!(found.financial_results, Some("ROI 12%".to_string()));
            }

            it "materializes nested features and tasks" {
                let project = db.create_project(CreateProjectInput {
                    name: "Nested".to_string(),
                    description: None,
                    financial_results: None,
                    features: vec![
                        CreateFeatureInput {
                            name: "Login".to_string(),
                            description: Some("Auth flow".to_string()),
                            tasks: vec![
                                CreateTaskInput {
                                    name: "Form".to_string(),
                                    description: None,
                                    status: Some("doing".to_string()),
                                },
                                task_input("Backend"),
                            ],
                        },
                        feature_input("Billing"),
                    ],
                }).expect("Failed to create project");

                let features = db.get_features_by_project(project.id).expect("Query failed");
                assert_eq!(features.len(), 2);
                assert_eq!(features[0].name, "Login");
                assert_eq!(features[0].project_id, project.id);
                assert_eq!(features[1].name, "Billing");

                let tasks = db.get_tasks_by_feature(features[0].id).expect("Query failed");
                assert_eq!(tasks.len(), 2);
                assert_eq!(tasks[0].status, "doing");
                assert_eq!(tasks[1].status, "pending");
                assert!(tasks.iter().all(|t| t.feature_id == features[0].id));

                assert!(db.get_tasks_by_feature(features[1].id).expect("Query failed").is_empty());
            }
        }

        describe "get_project" {
            it "returns None for non-existent project" {
                let result = db.get_project(9999).expect("Query failed");
                assert!(result.is_none());
            }

            it "includes features in the detailed view" {
                let project = create_test_project(&db);
                let feature = create_test_feature(&db, project.id);

                let detail = db.get_project_with_features(project.id)
                    .expect("Query failed")
                    .unwrap();
                assert_eq!(detail.project, project);
                assert_eq!(detail.features, vec![feature]);
            }
        }

        describe "get_all_projects" {
            it "returns empty list when no projects exist" {
                let projects = db.get_all_projects().expect("Query failed");
                assert!(projects.is_empty());
            }

            it "returns all projects in creation order" {
                db.create_project(project_input("Zebra")).expect("Failed to create");
                db.create_project(project_input("Alpha")).expect("Failed to create");

                let projects = db.get_all_projects().expect("Query failed");
                assert_eq!(projects.len(), 2);
                assert_eq!(projects[0].name, "Zebra");
                assert_eq!(projects[1].name, "Alpha");
            }
        }

        describe "update_project" {
            it "returns None for non-existent project" {
                let result = db.update_project(9999, UpdateProjectInput::default())
                    .expect("Query failed");
                assert!(result.is_none());
            }

            it "only replaces supplied fields" {
                let project = db.create_project(CreateProjectInput {
                    name: "Site".to_string(),
                    description: Some("Redesign".to_string()),
                    financial_results: Some("TBD".to_string()),
                    features: vec![],
                }).expect("Failed to create");

                db.update_project(project.id, UpdateProjectInput {
                    financial_results: Some(Some("+20% conversion".to_string())),
                    ..Default::default()
                }).expect("Update failed");

                let found = db.get_project(project.id).expect("Query failed").unwrap();
                assert_eq!(found.name, "Site");
                assert_eq!(found.description, Some("Redesign".to_string()));
                assert_eq!(found.financial_results, Some("+20% conversion".to_string()));
            }

            it "clears an optional field set to null" {
                let project = db.create_project(CreateProjectInput {
                    name: "Site".to_string(),
                    description: Some("Redesign".to_string()),
                    financial_results: None,
                    features: vec![],
                }).expect("Failed to create");

                db.update_project(project.id, UpdateProjectInput {
                    description: Some(None),
                    ..Default::default()
                }).expect("Update failed");

                let found = db.get_project(project.id).expect("Query failed").unwrap();
                assert!(found.description.is_none());
                assert_eq!(found.name, "Site");
            }
        }

        describe "delete_project" {
            it "returns false for non-existent project" {
                assert!(!db.delete_project(9999).expect("Delete failed"));
            }

            it "deletes the project and cascades to features and tasks" {
                let project = create_test_project(&db);
                let feature = create_test_feature(&db, project.id);
                let task = create_test_task(&db, feature.id);

                assert!(db.delete_project(project.id).expect("Failed to delete"));

                assert!(db.get_project(project.id).expect("Query failed").is_none());
                assert!(db.get_feature(feature.id).expect("Query failed").is_none());
                assert!(db.get_task(task.id).expect("Query failed").is_none());
            }

            it "leaves sibling projects untouched" {
                let doomed = create_test_project(&db);
                let kept = create_test_project(&db);
                create_test_feature(&db, doomed.id);
                let kept_feature = create_test_feature(&db, kept.id);
                let kept_task = create_test_task(&db, kept_feature.id);

                db.delete_project(doomed.id).expect("Failed to delete");

                assert!(db.get_feature(kept_feature.id).expect("Query failed").is_some());
                assert!(db.get_task(kept_task.id).expect("Query failed").is_some());
            }

            it "never reuses identifiers" {
                let first = create_test_project(&db);
                let second = create_test_project(&db);
                db.delete_project(second.id).expect("Failed to delete");

                let third = create_test_project(&db);
                assert!(third.id > second.id);
                assert!(second.id > first.id);
            }
        }
    }

    describe "features" {
        describe "create_feature" {
            it "returns None when the project does not exist" {
                let result = db.create_feature(9999, feature_input("Orphan"))
                    .expect("Query failed");
                assert!(result.is_none());
            }

            it "links the feature to its project" {
                let project = create_test_project(&db);
                let feature = db.create_feature(project.id, CreateFeatureInput {
                    name: "Search".to_string(),
                    description: Some("Full text".to_string()),
                    tasks: vec![],
                }).expect("Failed").unwrap();

                assert_eq!(feature.project_id, project.id);
                assert_eq!(db.get_feature(feature.id).expect("Query failed"), Some(feature));
            }

            it "creates embedded tasks" {
                let project = create_test_project(&db);
                let feature = db.create_feature(project.id, CreateFeatureInput {
                    name: "Search".to_string(),
                    description: None,
                    tasks: vec![task_input("Index"), task_input("Query")],
                }).expect("Failed").unwrap();

                let tasks = db.get_tasks_by_feature(feature.id).expect("Query failed");
                assert_eq!(tasks.len(), 2);
            }
        }

        describe "get_features_by_project" {
            it "returns empty list for a project with no features" {
                let project = create_test_project(&db);
                let features = db.get_features_by_project(project.id).expect("Query failed");
                assert!(features.is_empty());
            }

            it "only returns features of the given project" {
                let a = create_test_project(&db);
                let b = create_test_project(&db);
                create_test_feature(&db, a.id);
                create_test_feature(&db, b.id);

                let features = db.get_features_by_project(a.id).expect("Query failed");
                assert_eq!(features.len(), 1);
                assert_eq!(features[0].project_id, a.id);
            }
        }

        describe "update_feature" {
            it "returns None for non-existent feature" {
                let result = db.update_feature(9999, UpdateFeatureInput::default())
                    .expect("Query failed");
                assert!(result.is_none());
            }

            it "keeps absent fields" {
                let project = create_test_project(&db);
                let feature = db.create_feature(project.id, CreateFeatureInput {
                    name: "Search".to_string(),
                    description: Some("Full text".to_string()),
                    tasks: vec![],
                }).expect("Failed").unwrap();

                let updated = db.update_feature(feature.id, UpdateFeatureInput {
                    name: Some(Some("Discovery".to_string())),
                    ..Default::default()
                }).expect("Update failed").unwrap();

                assert_eq!(updated.name, "Discovery");
                assert_eq!(updated.description, Some("Full text".to_string()));
                assert_eq!(updated.project_id, project.id);
            }
        }

        describe "delete_feature" {
            it "returns false for non-existent feature" {
                assert!(!db.delete_feature(9999).expect("Delete failed"));
            }

            it "cascades to tasks but keeps the project" {
                let project = create_test_project(&db);
                let feature = create_test_feature(&db, project.id);
                let task = create_test_task(&db, feature.id);

                assert!(db.delete_feature(feature.id).expect("Failed to delete"));

                assert!(db.get_task(task.id).expect("Query failed").is_none());
                assert!(db.get_project(project.id).expect("Query failed").is_some());
            }
        }
    }

    describe "tasks" {
        describe "create_task" {
            it "returns None when the feature does not exist" {
                let result = db.create_task(9999, task_input("Orphan")).expect("Query failed");
                assert!(result.is_none());
            }

            it "defaults status to pending" {
                let project = create_test_project(&db);
                let feature = create_test_feature(&db, project.id);
                let task = create_test_task(&db, feature.id);

                assert_eq!(task.status, DEFAULT_TASK_STATUS);
                assert_eq!(task.feature_id, feature.id);
            }

            it "accepts any status text" {
                let project = create_test_project(&db);
                let feature = create_test_feature(&db, project.id);
                let task = db.create_task(feature.id, CreateTaskInput {
                    name: "Odd".to_string(),
                    description: None,
                    status: Some("blocked-on-legal".to_string()),
                }).expect("Failed").unwrap();

                let found = db.get_task(task.id).expect("Query failed").unwrap();
                assert_eq!(found.status, "blocked-on-legal");
                assert_eq!(found.modified_at, task.modified_at);
            }
        }

        describe "update_task" {
            it "returns None for non-existent task" {
                let result = db.update_task(9999, UpdateTaskInput::default())
                    .expect("Query failed");
                assert!(result.is_none());
            }

            it "changes status without touching name or description" {
                let project = create_test_project(&db);
                let feature = create_test_feature(&db, project.id);
                let task = db.create_task(feature.id, CreateTaskInput {
                    name: "Form".to_string(),
                    description: Some("Login form".to_string()),
                    status: None,
                }).expect("Failed").unwrap();

                db.update_task(task.id, UpdateTaskInput {
                    status: Some(Some("done".to_string())),
                    ..Default::default()
                }).expect("Update failed");

                let found = db.get_task(task.id).expect("Query failed").unwrap();
                assert_eq!(found.name, "Form");
                assert_eq!(found.description, Some("Login form".to_string()));
                assert_eq!(found.status, "done");
                assert!(found.modified_at >= task.modified_at);
            }

            it "refreshes the timestamp even with no fields" {
                let project = create_test_project(&db);
                let feature = create_test_feature(&db, project.id);
                let task = create_test_task(&db, feature.id);

                std::thread::sleep(std::time::Duration::from_millis(5));
                let updated = db.update_task(task.id, UpdateTaskInput::default())
                    .expect("Update failed")
                    .unwrap();

                assert!(updated.modified_at > task.modified_at);
                assert_eq!(updated.name, task.name);
                assert_eq!(updated.status, task.status);
            }
        }

        describe "delete_task" {
            it "removes only the task" {
                let project = create_test_project(&db);
                let feature = create_test_feature(&db, project.id);
                let task = create_test_task(&db, feature.id);
                let sibling = create_test_task(&db, feature.id);

                assert!(db.delete_task(task.id).expect("Delete failed"));
                assert!(!db.delete_task(task.id).expect("Delete failed"));

                let remaining = db.get_tasks_by_feature(feature.id).expect("Query failed");
                assert_eq!(remaining, vec![sibling]);
            }
        }
    }
}

// Writes that fail partway must leave nothing behind. A trigger installed
// through a second connection makes SQLite abort in the middle of the
// transaction.
mod transactions {
    use super::*;
    use std::path::Path;

    fn file_db(dir: &Path) -> Database {
        let db = Database::open(dir.join("board.db")).expect("Failed to open database");
        db.migrate().expect("Failed to run migrations");
        db
    }

    fn install_trigger(dir: &Path, sql: &str) {
        let conn = rusqlite::Connection::open(dir.join("board.db"))
            .expect("Failed to open second connection");
        conn.execute_batch(sql).expect("Failed to install trigger");
    }

    #[test]
    fn failed_nested_create_writes_nothing() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db = file_db(dir.path());
        install_trigger(
            dir.path(),
            "CREATE TRIGGER block_tasks BEFORE INSERT ON tasks
             BEGIN SELECT RAISE(ABORT, 'tasks are locked'); END;",
        );

        let result = db.create_project(CreateProjectInput {
            name: "Nested".to_string(),
            description: None,
            financial_results: None,
            features: vec![CreateFeatureInput {
                name: "Login".to_string(),
                description: None,
                tasks: vec![task_input("Form")],
            }],
        });

        assert!(result.is_err());
        assert!(db.get_all_projects().expect("Query failed").is_empty());
        assert!(db.get_feature(1).expect("Query failed").is_none());
    }

    #[test]
    fn failed_cascade_delete_keeps_children() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db = file_db(dir.path());
        let project = create_test_project(&db);
        let feature = create_test_feature(&db, project.id);
        let task = create_test_task(&db, feature.id);
        install_trigger(
            dir.path(),
            "CREATE TRIGGER keep_projects BEFORE DELETE ON projects
             BEGIN SELECT RAISE(ABORT, 'projects are locked'); END;",
        );

        assert!(db.delete_project(project.id).is_err());

        assert_eq!(db.get_project(project.id).expect("Query failed"), Some(project));
        assert_eq!(db.get_feature(feature.id).expect("Query failed"), Some(feature));
        assert_eq!(db.get_task(task.id).expect("Query failed"), Some(task));
    }
}
