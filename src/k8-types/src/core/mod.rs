pub mod replication_controller;
