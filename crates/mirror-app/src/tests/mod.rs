mod workflow_flow_tests;
