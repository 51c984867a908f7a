yucore::bin!(yu_echo);
