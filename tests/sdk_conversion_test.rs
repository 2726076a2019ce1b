#[cfg(test)]
mod tests {
    use aws_sdk_cloudwatchlogs::types::FilteredLogEvent;
    use aws_sdk_ecs::types::{
        Container as SdkContainer, ContainerDefinition, LogConfiguration, LogDriver,
        Task as SdkTask, TaskDefinition as SdkTaskDefinition,
    };

    use ecsctl::commands::streams_by_group;
    use ecsctl::logs::cloudwatch::log_event_from_filtered;
    use ecsctl::models::{Task, TaskDefinition};
    use ecsctl::output::format_log_line;

    const TASK_ARN: &str = "arn:aws:ecs:us-east-1:123456789012:task/prod/0f9e8d7c6b5a";

    fn awslogs_container(name: &str, group: &str) -> ContainerDefinition {
        ContainerDefinition::builder()
            .name(name)
            .image(format!("example/{name}:latest"))
            .log_configuration(
                LogConfiguration::builder()
                    .log_driver(LogDriver::Awslogs)
                    .options("awslogs-group", group)
                    .options("awslogs-stream-prefix", "prod")
                    .build()
                    .unwrap(),
            )
            .build()
    }

    #[test]
    fn test_task_log_streams_are_derived_from_its_definition() {
        let task = Task::from(
            &SdkTask::builder()
                .task_arn(TASK_ARN)
                .task_definition_arn("arn:aws:ecs:us-east-1:123456789012:task-definition/api:7")
                .containers(SdkContainer::builder().name("api").task_arn(TASK_ARN).build())
                .containers(SdkContainer::builder().name("envoy").task_arn(TASK_ARN).build())
                .build(),
        );
        let definition = TaskDefinition::from(
            &SdkTaskDefinition::builder()
                .family("api")
                .revision(7)
                .container_definitions(awslogs_container("api", "/ecs/api"))
                .container_definitions(awslogs_container("envoy", "/ecs/mesh"))
                .container_definitions(awslogs_container("migrate", "/ecs/api"))
                .build(),
        );

        assert_eq!(task.id, "0f9e8d7c6b5a");
        assert_eq!(task.task_definition, "api:7");

        let targets = definition.log_targets(&task, None);
        let groups = streams_by_group(&targets);

        assert_eq!(groups.len(), 2);
        assert_eq!(
            groups["/ecs/api"],
            vec!["prod/api/0f9e8d7c6b5a", "prod/migrate/0f9e8d7c6b5a"]
        );
        assert_eq!(groups["/ecs/mesh"], vec!["prod/envoy/0f9e8d7c6b5a"]);
    }

    #[test]
    fn test_unprefixed_awslogs_stream_is_the_container_runtime_id() {
        let task = Task::from(
            &SdkTask::builder()
                .task_arn(TASK_ARN)
                .containers(
                    SdkContainer::builder()
                        .name("api")
                        .task_arn(TASK_ARN)
                        .runtime_id("9b2f6c1d0e4a")
                        .build(),
                )
                .containers(SdkContainer::builder().name("envoy").task_arn(TASK_ARN).build())
                .build(),
        );
        let unprefixed = |name: &str| {
            ContainerDefinition::builder()
                .name(name)
                .log_configuration(
                    LogConfiguration::builder()
                        .log_driver(LogDriver::Awslogs)
                        .options("awslogs-group", "/ecs/api")
                        .build()
                        .unwrap(),
                )
                .build()
        };
        let definition = TaskDefinition::from(
            &SdkTaskDefinition::builder()
                .family("api")
                .revision(8)
                .container_definitions(unprefixed("api"))
                .container_definitions(unprefixed("envoy"))
                .build(),
        );

        let targets = definition.log_targets(&task, None);

        assert_eq!(targets.len(), 2);
        assert_eq!(targets[1].stream, None);
        assert_eq!(streams_by_group(&targets)["/ecs/api"], vec!["9b2f6c1d0e4a"]);
    }

    #[test]
    fn test_filtered_event_renders_as_log_line() {
        let raw = FilteredLogEvent::builder()
            .log_stream_name("prod/api/0f9e8d7c6b5a")
            .timestamp(1_718_000_000_000)
            .message("listening on :8080\n")
            .ingestion_time(1_718_000_000_400)
            .event_id("38000000000000000000000000")
            .build();

        let event = log_event_from_filtered(&raw).unwrap();

        assert_eq!(
            format_log_line(&event),
            "prod/api/0f9e8d7c6b5a 2024-06-10 06:13:20 listening on :8080"
        );
    }

    #[test]
    fn test_log_event_json_uses_cloudwatch_field_names() {
        let raw = FilteredLogEvent::builder()
            .log_stream_name("s")
            .timestamp(1)
            .message("m")
            .ingestion_time(2)
            .event_id("e")
            .build();

        let json = serde_json::to_value(log_event_from_filtered(&raw).unwrap()).unwrap();

        assert_eq!(json["logStreamName"], "s");
        assert_eq!(json["ingestionTime"], 2);
        assert_eq!(json["eventId"], "e");
    }
}
